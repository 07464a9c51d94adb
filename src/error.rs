//! Error taxonomy for the console.
//!
//! None of these are fatal: the controller absorbs every variant into the
//! snapshot it exposes to the host UI.

/// Advisory shown when the platform rejects a recognition start.
pub const START_REJECTED_ADVISORY: &str =
    "No se pudo iniciar el reconocimiento de voz. Intenta nuevamente.";

/// Advisory shown when a capture fails mid-session.
pub const RECOGNITION_FAILED_ADVISORY: &str = "Hubo un error con el reconocimiento de voz.";

/// Advisory hosts print once when speech input is unavailable.
pub const UNSUPPORTED_ADVISORY: &str =
    "Tu entorno no soporta reconocimiento de voz. Puedes seguir escribiendo comandos manualmente.";

/// Fallback when the command service fails without saying why.
pub const GENERIC_SUBMISSION_ERROR: &str = "No se pudo contactar al servicio de comandos.";

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Speech input or output is not available on this host.
    #[error("speech capability unavailable: {0}")]
    CapabilityAbsent(&'static str),

    /// Start/stop race or capture failure; the session is back to idle.
    #[error("recognition error: {0}")]
    Recognition(String),

    /// The command service answered with an error.
    #[error("{0}")]
    Rejected(String),

    /// The command service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ConsoleError {
    /// Text surfaced as `lastError` for a failed submission.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Rejected(detail) if !detail.trim().is_empty() => detail.clone(),
            ConsoleError::Recognition(_) => RECOGNITION_FAILED_ADVISORY.to_string(),
            ConsoleError::CapabilityAbsent(_) => UNSUPPORTED_ADVISORY.to_string(),
            _ => GENERIC_SUBMISSION_ERROR.to_string(),
        }
    }
}

/// Derive the user-facing message for any collaborator failure.
///
/// Typed console errors keep their own mapping; anything else uses its
/// display text, or the generic message when that is empty.
pub fn submission_error_message(err: &anyhow::Error) -> String {
    if let Some(console_err) = err.downcast_ref::<ConsoleError>() {
        return console_err.user_message();
    }
    let text = err.to_string();
    if text.trim().is_empty() {
        GENERIC_SUBMISSION_ERROR.to_string()
    } else {
        text
    }
}
