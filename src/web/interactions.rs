//! Interactions endpoint handler.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use tracing::{debug, warn};

use super::error::ApiError;
use super::signature::{InteractionVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::command::CommandHandler;
use crate::discord::types::{
    Interaction, InteractionResponse, INTERACTION_APPLICATION_COMMAND, INTERACTION_PING,
};

/// Shared state of the interactions endpoint.
pub struct AppState {
    pub verifier: InteractionVerifier,
    pub commands: Arc<CommandHandler>,
}

impl AppState {
    pub fn new(verifier: InteractionVerifier, commands: Arc<CommandHandler>) -> Self {
        Self { verifier, commands }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /interactions
///
/// Verifies the request signature, answers PINGs and dispatches
/// application commands.
pub async fn interactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, ApiError> {
    let verified = match (
        header(&headers, SIGNATURE_HEADER),
        header(&headers, TIMESTAMP_HEADER),
    ) {
        (Some(signature), Some(timestamp)) => state.verifier.verify(signature, timestamp, &body),
        _ => false,
    };
    if !verified {
        warn!("Rejected interaction with an invalid signature");
        return Err(ApiError::unauthorized("invalid request signature"));
    }

    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid interaction: {e}")))?;

    match interaction.kind {
        INTERACTION_PING => {
            debug!("Answering interaction PING");
            Ok(Json(InteractionResponse::pong()))
        }
        INTERACTION_APPLICATION_COMMAND => {
            let reply = state.commands.handle_interaction(&interaction).await;
            Ok(Json(InteractionResponse::message(reply)))
        }
        other => Err(ApiError::bad_request(format!(
            "unsupported interaction type {other}"
        ))),
    }
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
