use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::snapshot::{ConsoleAction, ConsoleHandle, ConsoleSnapshot, SAMPLE_COMMANDS};
use super::timer::ClearTimer;
use crate::config::ConsoleConfig;
use crate::feedback::FeedbackSynthesizer;
use crate::platform::{RecognitionOptions, SpeechPlatform, TaggedRecognitionEvent};
use crate::recognition::RecognitionManager;
use crate::submission::{CommandExecutor, Invalidator, Settlement, SubmissionPipeline};

/// Capacity of the host action queue
const ACTION_QUEUE: usize = 64;

/// Distinct recognition tag per controller
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Settings for a console controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub recognition: RecognitionOptions,
    /// Delay before a voice-originated command is cleared
    pub clear_delay: Duration,
    pub invalidate_scopes: Vec<String>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            recognition: RecognitionOptions::default(),
            clear_delay: Duration::from_millis(200),
            invalidate_scopes: vec![
                "inventory".to_string(),
                "employees".to_string(),
                "reminders".to_string(),
            ],
        }
    }
}

impl From<&ConsoleConfig> for ControllerOptions {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            recognition: config.recognition_options(),
            clear_delay: config.clear_delay(),
            invalidate_scopes: config.console.invalidate_scopes.clone(),
        }
    }
}

/// Everything the controller reacts to
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Action(ConsoleAction),
    Recognition(TaggedRecognitionEvent),
    Settled(Settlement),
    /// The voice-submission clear timer fired
    ClearCommandText,
}

/// Voice command console
///
/// Owns the draft command and composes recognition, submission and spoken
/// feedback. All state lives on the task that drives `run` (or, in tests,
/// whoever calls `next_event`/`handle`), so nothing here is locked.
pub struct ConsoleController {
    /// Draft command
    command_text: String,

    placeholder_index: usize,

    recognition: RecognitionManager,
    pipeline: SubmissionPipeline,
    feedback: FeedbackSynthesizer,

    /// Pending clear of a voice-originated draft
    clear_timer: ClearTimer,
    clear_delay: Duration,

    actions: mpsc::Receiver<ConsoleAction>,
    recognition_events: mpsc::UnboundedReceiver<TaggedRecognitionEvent>,
    settlements: mpsc::UnboundedReceiver<Settlement>,
    snapshots: watch::Sender<ConsoleSnapshot>,

    torn_down: bool,
}

impl ConsoleController {
    /// Build a controller and the handle hosts use to drive it
    ///
    /// Speech support is probed once here and cached for the controller's
    /// lifetime.
    pub fn new(
        options: ControllerOptions,
        platform: &dyn SpeechPlatform,
        executor: Arc<dyn CommandExecutor>,
        invalidator: Arc<dyn Invalidator>,
    ) -> (Self, ConsoleHandle) {
        let support = platform.detect_support();
        info!(
            "Speech support: recognition={}, synthesis={}",
            support.recognition, support.synthesis
        );

        let (action_tx, action_rx) = mpsc::channel(ACTION_QUEUE);
        let (recognition_tx, recognition_rx) = mpsc::unbounded_channel();
        let (settlement_tx, settlement_rx) = mpsc::unbounded_channel();

        let session = NEXT_SESSION.fetch_add(1, Ordering::SeqCst);
        let locale = options.recognition.locale.clone();
        let recognition = RecognitionManager::new(
            platform,
            support.recognition,
            options.recognition,
            session,
            recognition_tx,
        );
        let feedback = FeedbackSynthesizer::new(platform, support.synthesis, locale);
        let pipeline = SubmissionPipeline::new(
            executor,
            invalidator,
            options.invalidate_scopes,
            settlement_tx,
        );

        let controller = Self {
            command_text: String::new(),
            placeholder_index: 0,
            recognition,
            pipeline,
            feedback,
            clear_timer: ClearTimer::default(),
            clear_delay: options.clear_delay,
            actions: action_rx,
            recognition_events: recognition_rx,
            settlements: settlement_rx,
            snapshots: watch::channel(ConsoleSnapshot::default()).0,
            torn_down: false,
        };
        controller.snapshots.send_replace(controller.snapshot());
        let snapshot_rx = controller.snapshots.subscribe();

        (controller, ConsoleHandle::new(action_tx, snapshot_rx))
    }

    /// Run the controller on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process events until shutdown, then tear down
    pub async fn run(mut self) {
        info!("Console controller running");
        while !self.torn_down {
            let event = self.next_event().await;
            self.handle(event).await;
        }
        info!("Console controller stopped");
    }

    /// Wait for the next event from any source
    ///
    /// A closed action queue (every handle dropped) reads as `Shutdown`.
    pub async fn next_event(&mut self) -> ConsoleEvent {
        tokio::select! {
            action = self.actions.recv() => {
                ConsoleEvent::Action(action.unwrap_or(ConsoleAction::Shutdown))
            }
            Some(event) = self.recognition_events.recv() => ConsoleEvent::Recognition(event),
            Some(settlement) = self.settlements.recv() => ConsoleEvent::Settled(settlement),
            _ = self.clear_timer.fired() => ConsoleEvent::ClearCommandText,
        }
    }

    /// Single entry point for every event
    pub async fn handle(&mut self, event: ConsoleEvent) {
        if self.torn_down {
            debug!("Ignoring event after teardown: {:?}", event);
            return;
        }

        match event {
            ConsoleEvent::Action(action) => self.apply(action).await,
            ConsoleEvent::Recognition(event) => {
                if let Some(transcript) = self.recognition.handle_event(event) {
                    self.on_transcript(transcript);
                }
            }
            ConsoleEvent::Settled(settlement) => {
                if self.pipeline.settle(settlement) {
                    self.feedback.observe(self.pipeline.last_result()).await;
                }
            }
            ConsoleEvent::ClearCommandText => {
                debug!("Clearing voice command from input");
                self.command_text.clear();
            }
        }

        self.publish();
    }

    async fn apply(&mut self, action: ConsoleAction) {
        match action {
            ConsoleAction::SetCommandText(text) => self.set_command_text(text),
            ConsoleAction::Submit => self.manual_submit(),
            ConsoleAction::ToggleListening => self.toggle_listening().await,
            ConsoleAction::ToggleVoiceFeedback => self.toggle_voice_feedback().await,
            ConsoleAction::CyclePlaceholder => self.cycle_placeholder(),
            ConsoleAction::Shutdown => self.teardown().await,
        }
    }

    pub fn set_command_text(&mut self, text: impl Into<String>) {
        self.command_text = text.into();
    }

    pub fn command_text(&self) -> &str {
        &self.command_text
    }

    /// Submit the draft and clear it at once, whatever the outcome
    ///
    /// A blank draft is left as is.
    pub fn manual_submit(&mut self) {
        if self.pipeline.submit(&self.command_text).is_none() {
            return;
        }
        self.clear_timer.cancel();
        self.command_text.clear();
    }

    /// Show a recognized command, submit it, and clear it shortly after
    pub fn on_transcript(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        self.pipeline.submit(&text);
        self.command_text = text;
        self.clear_timer.schedule(self.clear_delay);
    }

    pub async fn toggle_listening(&mut self) {
        if !self.recognition.is_supported() {
            return;
        }
        if self.recognition.is_listening() {
            self.recognition.stop().await;
        } else {
            self.recognition.start().await;
        }
    }

    pub async fn toggle_voice_feedback(&mut self) {
        let enabled = !self.feedback.is_enabled();
        self.feedback.set_enabled(enabled).await;
        if enabled {
            self.feedback.observe(self.pipeline.last_result()).await;
        }
    }

    pub fn cycle_placeholder(&mut self) {
        self.placeholder_index = (self.placeholder_index + 1) % SAMPLE_COMMANDS.len();
    }

    pub fn recognition(&self) -> &RecognitionManager {
        &self.recognition
    }

    pub fn pipeline(&self) -> &SubmissionPipeline {
        &self.pipeline
    }

    pub fn feedback(&self) -> &FeedbackSynthesizer {
        &self.feedback
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_timer.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Build the snapshot exposed to the host UI
    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            command_text: self.command_text.clone(),
            placeholder: SAMPLE_COMMANDS[self.placeholder_index].to_string(),
            is_submitting: self.pipeline.is_submitting(),
            last_result: self.pipeline.last_result().cloned(),
            last_error: self.pipeline.last_error().map(str::to_string),
            is_listening: self.recognition.is_listening(),
            is_speech_supported: self.recognition.is_supported(),
            voice_feedback_enabled: self.feedback.is_enabled(),
            voice_error: self.recognition.last_error().map(str::to_string),
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Release timers and speech resources; safe to call more than once
    pub async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        info!("Tearing down console controller");
        self.torn_down = true;
        self.clear_timer.cancel();
        self.recognition.release().await;
        self.feedback.cancel().await;
    }
}
