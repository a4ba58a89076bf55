use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::BookingRequest;
use crate::services::conversation::{self, TurnOutcome};
use crate::state::AppState;

// POST /api/conversations
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub booking: Option<BookingRequest>,
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TurnOutcome>), AppError> {
    // An empty body starts without prefill; anything else must be a valid request.
    let payload: StartRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?
    };
    let outcome = conversation::start_conversation(&state, payload.booking).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

// POST /api/conversations/:id/messages
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let outcome = conversation::process_message(&state, &id, text).await?;
    Ok(Json(outcome))
}

// DELETE /api/conversations/:id
pub async fn end(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if conversation::end_conversation(&state, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("conversation {id}")))
    }
}
