use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Speech capabilities present on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechSupport {
    /// Speech-to-text is available
    pub recognition: bool,
    /// Text-to-speech is available
    pub synthesis: bool,
}

/// Options applied to every capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP-47 locale (e.g. "es-ES")
    pub locale: String,
    /// Whether interim (partial) results are delivered
    pub interim_results: bool,
    /// Alternatives requested per result
    pub max_alternatives: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            locale: "es-ES".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Event reported by a native recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Final results; each inner list holds the alternatives of one result
    Results(Vec<Vec<String>>),
    /// Capture failed
    Error(String),
    /// The session terminated (timeout, stop, or after a result)
    End,
}

/// Recognition event tagged with the session and capture it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRecognitionEvent {
    pub session: u64,
    /// Capture number within the session; 0 before the first capture
    pub capture: u64,
    pub event: RecognitionEvent,
}

/// Where a native session reports its events
///
/// Handles call `begin_capture` when a start begins a capture and report that
/// capture's events through the returned sink. Events from an earlier
/// capture then carry a stale number and are dropped by the owner.
#[derive(Debug, Clone)]
pub struct RecognitionEventSink {
    session: u64,
    capture: u64,
    latest_capture: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<TaggedRecognitionEvent>,
}

impl RecognitionEventSink {
    pub fn new(session: u64, tx: mpsc::UnboundedSender<TaggedRecognitionEvent>) -> Self {
        Self {
            session,
            capture: 0,
            latest_capture: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Capture this sink reports for
    pub fn capture(&self) -> u64 {
        self.capture
    }

    /// Most recent capture begun through any clone of this sink
    pub fn latest_capture(&self) -> u64 {
        self.latest_capture.load(Ordering::SeqCst)
    }

    /// Sink for a new capture
    pub fn begin_capture(&self) -> Self {
        let capture = self.latest_capture.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            capture,
            ..self.clone()
        }
    }

    /// Deliver an event; returns false once the owner is gone
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        self.tx
            .send(TaggedRecognitionEvent {
                session: self.session,
                capture: self.capture,
                event,
            })
            .is_ok()
    }
}

/// A text-to-speech request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
}

/// Native speech-capture session
///
/// Implementations report results through the `RecognitionEventSink` they
/// were created with, one `begin_capture` sink per start. A second `start`
/// while capturing is expected to fail, as most platforms reject it.
#[async_trait::async_trait]
pub trait RecognitionHandle: Send {
    /// Begin capturing a single utterance
    async fn start(&mut self) -> Result<()>;

    /// Request graceful termination of the capture
    async fn stop(&mut self) -> Result<()>;

    /// Free native resources; no events may be emitted afterwards
    async fn release(&mut self);

    /// Get handle name for logging
    fn name(&self) -> &str;
}

/// Native text-to-speech output
#[async_trait::async_trait]
pub trait UtteranceChannel: Send {
    /// Queue an utterance for playback
    async fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Cancel the active utterance and everything queued behind it
    async fn cancel_all(&mut self) -> Result<()>;

    /// Get channel name for logging
    fn name(&self) -> &str;
}

/// Host-provided speech capabilities
///
/// Implementations:
/// - `UnsupportedPlatform`: text-only hosts
/// - `NatsSpeechPlatform`: capture and synthesis services reached over NATS
pub trait SpeechPlatform: Send + Sync {
    /// Probe which capabilities exist; callers cache the answer
    fn detect_support(&self) -> SpeechSupport;

    /// Create the native recognition session
    fn create_session(
        &self,
        options: RecognitionOptions,
        events: RecognitionEventSink,
    ) -> Result<Box<dyn RecognitionHandle>>;

    /// Create the native synthesis channel
    fn create_utterance_channel(&self) -> Result<Box<dyn UtteranceChannel>>;
}
