use crate::console::ConsoleHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running console controller
    pub console: ConsoleHandle,
}

impl AppState {
    pub fn new(console: ConsoleHandle) -> Self {
        Self { console }
    }
}
