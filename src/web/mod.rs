//! Web module for giveaway-scout.
//!
//! Serves Discord's HTTP interactions endpoint, which is how slash
//! commands reach the bot, plus a health check.

pub mod error;
pub mod interactions;
pub mod router;
pub mod server;
pub mod signature;

pub use error::ApiError;
pub use interactions::AppState;
pub use router::{create_app, create_router};
pub use server::WebServer;
pub use signature::InteractionVerifier;
