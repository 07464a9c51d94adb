//! HTTP API for host UIs
//!
//! This module exposes a running console over REST:
//! - GET /console - Current snapshot
//! - POST /console/text - Replace the draft command
//! - POST /console/submit - Submit the draft
//! - POST /console/listen - Toggle speech capture
//! - POST /console/voice - Toggle spoken feedback
//! - POST /console/placeholder - Show the next sample command
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
