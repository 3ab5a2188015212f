//! giveaway-scout
//!
//! A Discord bot that polls subreddits and RSS/Atom feeds for giveaway
//! posts and relays matches to each guild's configured channel.

pub mod app;
pub mod command;
pub mod config;
pub mod datetime;
pub mod db;
pub mod discord;
pub mod error;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod scan;
pub mod source;
pub mod web;

pub use config::Config;
pub use db::{Database, DbPool};
pub use error::{Result, ScoutError};
pub use registry::{ChannelId, Subscriber, SubscriberRegistry};
pub use scan::{CycleReport, DedupScope, PollDispatcher};
pub use source::{FeedItem, FeedSource};
