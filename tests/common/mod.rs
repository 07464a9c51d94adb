// Fakes shared by the integration tests
//
// Each fake records what the console asked of it so tests can assert on
// platform calls without a real speech engine or agent service.

#![allow(dead_code)]

use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use voice_console::console::{ConsoleController, ConsoleEvent, ConsoleHandle, ControllerOptions};
use voice_console::error::ConsoleError;
use voice_console::platform::{
    RecognitionEvent, RecognitionEventSink, RecognitionHandle, RecognitionOptions, SpeechPlatform,
    SpeechSupport, Utterance, UtteranceChannel,
};
use voice_console::submission::{CommandExecutor, CommandResult, Invalidator};

// ============================================================================
// Speech platform
// ============================================================================

#[derive(Debug, Default)]
pub struct PlatformLog {
    pub sessions_created: usize,
    pub starts: usize,
    pub stops: usize,
    pub releases: usize,
    pub capturing: bool,
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
    pub options: Option<RecognitionOptions>,
}

#[derive(Clone)]
pub struct FakePlatform {
    support: SpeechSupport,
    log: Arc<Mutex<PlatformLog>>,
    sink: Arc<Mutex<Option<RecognitionEventSink>>>,
    reject_start: Arc<AtomicBool>,
    fail_stop: Arc<AtomicBool>,
}

impl FakePlatform {
    pub fn with_support(recognition: bool, synthesis: bool) -> Self {
        Self {
            support: SpeechSupport {
                recognition,
                synthesis,
            },
            log: Arc::new(Mutex::new(PlatformLog::default())),
            sink: Arc::new(Mutex::new(None)),
            reject_start: Arc::new(AtomicBool::new(false)),
            fail_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn full() -> Self {
        Self::with_support(true, true)
    }

    pub fn without_speech() -> Self {
        Self::with_support(false, false)
    }

    pub fn log(&self) -> MutexGuard<'_, PlatformLog> {
        self.log.lock().unwrap()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.log().spoken.iter().map(|u| u.text.clone()).collect()
    }

    /// Make the next starts fail the way browsers reject a duplicate start
    pub fn reject_starts(&self, reject: bool) {
        self.reject_start.store(reject, Ordering::SeqCst);
    }

    /// Make stop throw, as some platforms do on an idle session
    pub fn fail_stops(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    /// Emit an event from the native session, as the platform would
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        if matches!(event, RecognitionEvent::End | RecognitionEvent::Error(_)) {
            self.log().capturing = false;
        }
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    pub fn emit_transcript(&self, text: &str) -> bool {
        self.emit(RecognitionEvent::Results(vec![vec![text.to_string()]]))
    }

    /// Sink of the most recent capture, kept to emit late events later
    pub fn capture_sink(&self) -> Option<RecognitionEventSink> {
        self.sink.lock().unwrap().clone()
    }
}

impl SpeechPlatform for FakePlatform {
    fn detect_support(&self) -> SpeechSupport {
        self.support
    }

    fn create_session(
        &self,
        options: RecognitionOptions,
        events: RecognitionEventSink,
    ) -> Result<Box<dyn RecognitionHandle>> {
        if !self.support.recognition {
            return Err(ConsoleError::CapabilityAbsent("speech recognition").into());
        }
        {
            let mut log = self.log();
            log.sessions_created += 1;
            log.options = Some(options);
        }
        *self.sink.lock().unwrap() = Some(events.clone());
        Ok(Box::new(FakeRecognition {
            events,
            sink: Arc::clone(&self.sink),
            log: Arc::clone(&self.log),
            reject_start: Arc::clone(&self.reject_start),
            fail_stop: Arc::clone(&self.fail_stop),
        }))
    }

    fn create_utterance_channel(&self) -> Result<Box<dyn UtteranceChannel>> {
        if !self.support.synthesis {
            return Err(ConsoleError::CapabilityAbsent("speech synthesis").into());
        }
        Ok(Box::new(FakeChannel {
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeRecognition {
    events: RecognitionEventSink,
    sink: Arc<Mutex<Option<RecognitionEventSink>>>,
    log: Arc<Mutex<PlatformLog>>,
    reject_start: Arc<AtomicBool>,
    fail_stop: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl RecognitionHandle for FakeRecognition {
    async fn start(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.starts += 1;
        if self.reject_start.load(Ordering::SeqCst) || log.capturing {
            bail!("InvalidStateError: recognition has already started");
        }
        log.capturing = true;
        *self.sink.lock().unwrap() = Some(self.events.begin_capture());
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        if self.fail_stop.load(Ordering::SeqCst) || !log.capturing {
            bail!("InvalidStateError: recognition is not running");
        }
        log.capturing = false;
        Ok(())
    }

    async fn release(&mut self) {
        self.log.lock().unwrap().releases += 1;
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeChannel {
    log: Arc<Mutex<PlatformLog>>,
}

#[async_trait::async_trait]
impl UtteranceChannel for FakeChannel {
    async fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.log.lock().unwrap().spoken.push(utterance);
        Ok(())
    }

    async fn cancel_all(&mut self) -> Result<()> {
        self.log.lock().unwrap().cancels += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Command service
// ============================================================================

/// Replies immediately with a message echoing the command
#[derive(Default)]
pub struct EchoExecutor {
    calls: Mutex<Vec<String>>,
}

impl EchoExecutor {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for EchoExecutor {
    async fn execute(&self, command: &str) -> Result<CommandResult> {
        self.calls.lock().unwrap().push(command.to_string());
        CommandResult::from_value(json!({
            "action": "echo",
            "message": format!("Hecho: {}", command),
        }))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

type Reply = std::result::Result<Value, String>;

/// Holds every command until the test resolves it
#[derive(Default)]
pub struct GatedExecutor {
    calls: Mutex<Vec<String>>,
    pending: Mutex<Vec<(String, oneshot::Sender<Reply>)>>,
}

impl GatedExecutor {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Answer the pending call for `command`, waiting for it to arrive
    pub async fn resolve(&self, command: &str, reply: Reply) {
        for _ in 0..1000 {
            let waiting = {
                let mut pending = self.pending.lock().unwrap();
                pending
                    .iter()
                    .position(|(c, _)| c == command)
                    .map(|index| pending.remove(index).1)
            };
            if let Some(tx) = waiting {
                tx.send(reply).expect("submission task dropped");
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("no pending call for {:?}", command);
    }
}

#[async_trait::async_trait]
impl CommandExecutor for GatedExecutor {
    async fn execute(&self, command: &str) -> Result<CommandResult> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(command.to_string());
        self.pending.lock().unwrap().push((command.to_string(), tx));

        match rx.await? {
            Ok(value) => CommandResult::from_value(value),
            Err(detail) => Err(ConsoleError::Rejected(detail).into()),
        }
    }

    fn name(&self) -> &str {
        "gated"
    }
}

#[derive(Default)]
pub struct RecordingInvalidator {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingInvalidator {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Invalidator for RecordingInvalidator {
    async fn invalidate(&self, scopes: &[String]) -> Result<()> {
        self.calls.lock().unwrap().push(scopes.to_vec());
        Ok(())
    }
}

// ============================================================================
// Controller helpers
// ============================================================================

pub struct Harness {
    pub controller: ConsoleController,
    pub handle: ConsoleHandle,
    pub invalidator: Arc<RecordingInvalidator>,
}

pub fn harness(platform: &FakePlatform, executor: Arc<dyn CommandExecutor>) -> Harness {
    let invalidator = Arc::new(RecordingInvalidator::default());
    let (controller, handle) = ConsoleController::new(
        ControllerOptions::default(),
        platform,
        executor,
        invalidator.clone(),
    );
    Harness {
        controller,
        handle,
        invalidator,
    }
}

/// Wait for the next event, apply it, and return it
pub async fn pump(controller: &mut ConsoleController) -> ConsoleEvent {
    let event = tokio::time::timeout(Duration::from_secs(5), controller.next_event())
        .await
        .expect("no console event within 5s");
    controller.handle(event.clone()).await;
    event
}

pub fn message_of(result: Option<&CommandResult>) -> Option<String> {
    result.and_then(|r| r.message.clone())
}
