use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Console state
        .route("/console", get(handlers::get_console))
        // Console actions
        .route("/console/text", post(handlers::set_text))
        .route("/console/submit", post(handlers::submit))
        .route("/console/listen", post(handlers::toggle_listening))
        .route("/console/voice", post(handlers::toggle_voice_feedback))
        .route("/console/placeholder", post(handlers::cycle_placeholder))
        // Browser-based host UIs live on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
