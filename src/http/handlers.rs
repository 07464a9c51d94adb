use super::state::AppState;
use crate::console::{ConsoleAction, ConsoleSnapshot};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Replace the draft before submitting
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Queue actions on the controller, in order
async fn dispatch(state: &AppState, actions: Vec<ConsoleAction>) -> Response {
    for action in actions {
        if let Err(e) = state.console.send(action).await {
            error!("Failed to dispatch console action: {:#}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("{:#}", e),
                }),
            )
                .into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}

/// GET /console
/// Current console snapshot
pub async fn get_console(State(state): State<AppState>) -> Json<ConsoleSnapshot> {
    Json(state.console.snapshot())
}

/// POST /console/text
/// Replace the draft command
pub async fn set_text(State(state): State<AppState>, Json(req): Json<TextRequest>) -> Response {
    dispatch(&state, vec![ConsoleAction::SetCommandText(req.text)]).await
}

/// POST /console/submit
/// Submit the draft, optionally replacing it first
pub async fn submit(State(state): State<AppState>, body: Option<Json<SubmitRequest>>) -> Response {
    let mut actions = Vec::with_capacity(2);
    if let Some(text) = body.and_then(|Json(req)| req.text) {
        actions.push(ConsoleAction::SetCommandText(text));
    }
    actions.push(ConsoleAction::Submit);
    dispatch(&state, actions).await
}

/// POST /console/listen
pub async fn toggle_listening(State(state): State<AppState>) -> Response {
    dispatch(&state, vec![ConsoleAction::ToggleListening]).await
}

/// POST /console/voice
pub async fn toggle_voice_feedback(State(state): State<AppState>) -> Response {
    dispatch(&state, vec![ConsoleAction::ToggleVoiceFeedback]).await
}

/// POST /console/placeholder
pub async fn cycle_placeholder(State(state): State<AppState>) -> Response {
    dispatch(&state, vec![ConsoleAction::CyclePlaceholder]).await
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
