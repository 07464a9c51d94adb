//! Spoken feedback for command results

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::platform::{SpeechPlatform, Utterance, UtteranceChannel};
use crate::submission::CommandResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackState {
    pub enabled: bool,
    pub last_spoken_message: Option<String>,
}

impl Default for FeedbackState {
    fn default() -> Self {
        Self {
            enabled: true,
            last_spoken_message: None,
        }
    }
}

/// Speaks new result messages, never the same message twice in a row
///
/// Without a synthesis channel every call is a silent no-op on the platform
/// side; the enabled flag still follows the user's toggle.
pub struct FeedbackSynthesizer {
    channel: Option<Box<dyn UtteranceChannel>>,
    locale: String,
    state: FeedbackState,
}

impl FeedbackSynthesizer {
    pub fn new(platform: &dyn SpeechPlatform, supported: bool, locale: String) -> Self {
        let channel = if supported {
            match platform.create_utterance_channel() {
                Ok(channel) => {
                    info!("Speech synthesis channel ready ({})", channel.name());
                    Some(channel)
                }
                Err(e) => {
                    warn!("Speech synthesis unavailable: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            channel,
            locale,
            state: FeedbackState::default(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    /// React to the latest result; returns true if something was spoken
    pub async fn observe(&mut self, result: Option<&CommandResult>) -> bool {
        if !self.state.enabled {
            return false;
        }
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        let Some(message) = result.and_then(|r| r.message.as_deref()) else {
            return false;
        };
        if message.is_empty() || self.state.last_spoken_message.as_deref() == Some(message) {
            return false;
        }

        // At most one utterance is active
        if let Err(e) = channel.cancel_all().await {
            debug!("Failed to cancel active utterance: {:#}", e);
        }
        let utterance = Utterance {
            text: message.to_string(),
            locale: self.locale.clone(),
        };
        if let Err(e) = channel.speak(utterance).await {
            warn!("Failed to speak feedback: {:#}", e);
        } else {
            debug!("Speaking feedback: {}", message);
        }
        self.state.last_spoken_message = Some(message.to_string());
        true
    }

    /// Switch feedback on or off
    ///
    /// Disabling cancels the active utterance and forgets the last spoken
    /// message, so the current result is spoken again once re-enabled.
    pub async fn set_enabled(&mut self, enabled: bool) {
        if self.state.enabled == enabled {
            return;
        }
        info!("Voice feedback {}", if enabled { "enabled" } else { "disabled" });
        self.state.enabled = enabled;

        if !enabled {
            self.state.last_spoken_message = None;
            self.cancel().await;
        }
    }

    /// Silence any active utterance
    pub async fn cancel(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            if let Err(e) = channel.cancel_all().await {
                debug!("Failed to cancel speech: {:#}", e);
            }
        }
    }
}
