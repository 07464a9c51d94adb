use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::submission::CommandResult;

/// Commands suggested as the input placeholder, in rotation order
pub const SAMPLE_COMMANDS: [&str; 3] = [
    "Vendí 3 unidades del SKU AZUL-01",
    "Registra que Ana llegó a las 9:05",
    "Crea un recordatorio para llamar a Carla mañana a las 10am",
];

/// Everything the host UI renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSnapshot {
    pub command_text: String,
    pub placeholder: String,
    pub is_submitting: bool,
    pub last_result: Option<CommandResult>,
    pub last_error: Option<String>,
    pub is_listening: bool,
    pub is_speech_supported: bool,
    pub voice_feedback_enabled: bool,
    pub voice_error: Option<String>,
}

impl Default for ConsoleSnapshot {
    fn default() -> Self {
        Self {
            command_text: String::new(),
            placeholder: SAMPLE_COMMANDS[0].to_string(),
            is_submitting: false,
            last_result: None,
            last_error: None,
            is_listening: false,
            is_speech_supported: false,
            voice_feedback_enabled: true,
            voice_error: None,
        }
    }
}

/// User actions accepted by the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Replace the draft command (typing)
    SetCommandText(String),
    /// Submit the draft
    Submit,
    ToggleListening,
    ToggleVoiceFeedback,
    CyclePlaceholder,
    /// Tear the console down
    Shutdown,
}

/// Cloneable host-side handle to a running console
#[derive(Debug, Clone)]
pub struct ConsoleHandle {
    actions: mpsc::Sender<ConsoleAction>,
    snapshots: watch::Receiver<ConsoleSnapshot>,
}

impl ConsoleHandle {
    pub(crate) fn new(
        actions: mpsc::Sender<ConsoleAction>,
        snapshots: watch::Receiver<ConsoleSnapshot>,
    ) -> Self {
        Self { actions, snapshots }
    }

    pub async fn send(&self, action: ConsoleAction) -> Result<()> {
        self.actions
            .send(action)
            .await
            .context("Console controller has shut down")
    }

    /// Set the draft and submit it in one go
    pub async fn submit_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(ConsoleAction::SetCommandText(text.into())).await?;
        self.send(ConsoleAction::Submit).await
    }

    /// Current snapshot
    pub fn snapshot(&self) -> ConsoleSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<ConsoleSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.actions.is_closed()
    }

    /// Shut the console down and wait for its task to finish tearing down
    ///
    /// Hosts call this on every exit path, including errors.
    pub async fn shutdown(&self, task: JoinHandle<()>) -> Result<()> {
        if let Err(e) = self.send(ConsoleAction::Shutdown).await {
            warn!("Console controller already stopped: {:#}", e);
        }
        task.await.context("Console controller panicked")
    }
}
