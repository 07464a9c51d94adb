use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{RECOGNITION_FAILED_ADVISORY, START_REJECTED_ADVISORY};
use crate::platform::{
    RecognitionEvent, RecognitionEventSink, RecognitionHandle, RecognitionOptions, SpeechPlatform,
    TaggedRecognitionEvent,
};

/// Observable state of the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionState {
    Idle,
    Listening,
    Error,
}

/// Wraps the native recognition handle in a single-session state machine
///
/// `idle --start--> listening --(error | end)--> idle`. A start while
/// listening is rejected; a start the platform refuses leaves the session
/// idle with an advisory set.
pub struct RecognitionManager {
    /// Native session, present only when the platform supports recognition
    handle: Option<Box<dyn RecognitionHandle>>,

    /// Tag carried by every event of this manager's handle
    session: u64,

    /// Shares the capture counter with the handle's sinks
    events: RecognitionEventSink,

    /// Cached result of the capability probe
    supported: bool,

    state: RecognitionState,

    /// User-facing advisory from the last failure
    last_error: Option<String>,

    /// Set once the handle has been released
    released: bool,
}

impl RecognitionManager {
    /// Acquire the native session if the platform can capture speech
    pub fn new(
        platform: &dyn SpeechPlatform,
        supported: bool,
        options: RecognitionOptions,
        session: u64,
        events: mpsc::UnboundedSender<TaggedRecognitionEvent>,
    ) -> Self {
        let events = RecognitionEventSink::new(session, events);
        let handle = if supported {
            match platform.create_session(options, events.clone()) {
                Ok(handle) => {
                    info!("Recognition session {} acquired ({})", session, handle.name());
                    Some(handle)
                }
                Err(e) => {
                    warn!("Speech recognition unavailable: {:#}", e);
                    None
                }
            }
        } else {
            info!("Speech recognition not supported on this host");
            None
        };

        Self {
            supported: handle.is_some(),
            handle,
            session,
            events,
            state: RecognitionState::Idle,
            last_error: None,
            released: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn state(&self) -> RecognitionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == RecognitionState::Listening
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Capture whose events are currently accepted
    pub fn current_capture(&self) -> u64 {
        self.events.latest_capture()
    }

    /// Begin capturing one utterance
    pub async fn start(&mut self) {
        if self.released {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            debug!("Ignoring start: recognition unsupported");
            return;
        };
        if self.state == RecognitionState::Listening {
            warn!("Recognition already listening; start rejected");
            return;
        }

        self.last_error = None;
        match handle.start().await {
            Ok(()) => {
                self.transition(RecognitionState::Listening);
            }
            Err(e) => {
                warn!("Recognition start rejected: {:#}", e);
                self.transition(RecognitionState::Idle);
                self.last_error = Some(START_REJECTED_ADVISORY.to_string());
            }
        }
    }

    /// Request graceful termination; always safe to call
    pub async fn stop(&mut self) {
        if self.stop_native().await {
            self.transition(RecognitionState::Idle);
        }
    }

    fn transition(&mut self, next: RecognitionState) {
        if self.state != next {
            debug!(
                "Recognition session {}: {:?} -> {:?}",
                self.session, self.state, next
            );
            self.state = next;
        }
    }

    /// Returns false when there is no native session to stop
    async fn stop_native(&mut self) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        if let Err(e) = handle.stop().await {
            // Some platforms throw when stopping an idle session
            debug!("Ignoring recognition stop failure: {:#}", e);
        }
        true
    }

    /// Apply an event from the native session
    ///
    /// Returns the transcript to forward, if the event carried a usable one.
    /// Events from another session or an earlier capture, or arriving after
    /// release, are dropped.
    pub fn handle_event(&mut self, tagged: TaggedRecognitionEvent) -> Option<String> {
        let capture = self.current_capture();
        if self.released || tagged.session != self.session || tagged.capture != capture {
            debug!(
                "Dropping recognition event from {}/{} (current {}/{}, released={})",
                tagged.session, tagged.capture, self.session, capture, self.released
            );
            return None;
        }

        match tagged.event {
            RecognitionEvent::Results(results) => {
                let transcript = results
                    .into_iter()
                    .next()
                    .and_then(|alternatives| alternatives.into_iter().next())
                    .filter(|text| !text.trim().is_empty());
                match &transcript {
                    Some(text) => info!("Recognized: {}", text),
                    None => debug!("Dropping empty transcript"),
                }
                transcript
            }
            RecognitionEvent::Error(message) => {
                error!("Speech recognition error: {}", message);
                self.transition(RecognitionState::Error);
                self.last_error = Some(RECOGNITION_FAILED_ADVISORY.to_string());
                // Errors are not sticky
                self.transition(RecognitionState::Idle);
                None
            }
            RecognitionEvent::End => {
                debug!("Recognition session {} ended", self.session);
                self.transition(RecognitionState::Idle);
                None
            }
        }
    }

    /// Stop and free the native session exactly once
    ///
    /// Exposed state is left untouched.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.stop_native().await;
        if let Some(mut handle) = self.handle.take() {
            handle.release().await;
            info!("Recognition session {} released", self.session);
        }
    }
}
