use serde::{Deserialize, Serialize};

/// Request to begin capturing one utterance
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureStartMessage {
    pub session_id: String,
    pub language: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
    pub timestamp: String,  // RFC3339 timestamp
}

/// Request to end a capture gracefully
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureStopMessage {
    pub session_id: String,
    pub timestamp: String,
}

/// Transcript message received from the STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    pub confidence: f32,
    /// Further alternatives, best first, after `text`
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// Capture lifecycle notification from the STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureStatusMessage {
    pub session_id: String,
    pub state: CaptureState,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    Error,
    Ended,
}

/// Utterance request for the TTS service
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakMessage {
    pub text: String,
    pub language: String,
    pub timestamp: String,
}

/// Command request for the agent service
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentCommandMessage {
    pub command: String,
}

/// Error reply from the agent service
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentErrorMessage {
    pub error: String,
}

/// Published after a successful command so dependent views refetch
#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateMessage {
    pub scopes: Vec<String>,
    pub timestamp: String,
}
