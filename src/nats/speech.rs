use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::{subjects, NatsClient};
use super::messages::{
    CaptureStartMessage, CaptureState, CaptureStatusMessage, CaptureStopMessage, SpeakMessage,
    TranscriptMessage,
};
use crate::platform::{
    RecognitionEvent, RecognitionEventSink, RecognitionHandle, RecognitionOptions, SpeechPlatform,
    SpeechSupport, Utterance, UtteranceChannel,
};

/// Speech capture and synthesis provided by services on the NATS bus
///
/// Capture: `stt.capture.start` / `stt.capture.stop`, results on
/// `stt.text.>` and lifecycle on `stt.status.>`, filtered by session ID.
/// Synthesis: `tts.speak` / `tts.cancel`.
#[derive(Clone)]
pub struct NatsSpeechPlatform {
    client: NatsClient,
}

impl NatsSpeechPlatform {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

impl SpeechPlatform for NatsSpeechPlatform {
    fn detect_support(&self) -> SpeechSupport {
        SpeechSupport {
            recognition: true,
            synthesis: true,
        }
    }

    fn create_session(
        &self,
        options: RecognitionOptions,
        events: RecognitionEventSink,
    ) -> Result<Box<dyn RecognitionHandle>> {
        Ok(Box::new(NatsRecognitionHandle {
            client: self.client.clone(),
            options,
            events,
            capture_id: None,
            capturing: Arc::new(AtomicBool::new(false)),
            listener: None,
        }))
    }

    fn create_utterance_channel(&self) -> Result<Box<dyn UtteranceChannel>> {
        Ok(Box::new(NatsUtteranceChannel {
            client: self.client.clone(),
        }))
    }
}

pub struct NatsRecognitionHandle {
    client: NatsClient,
    options: RecognitionOptions,
    events: RecognitionEventSink,

    /// ID of the current (or last) capture
    capture_id: Option<String>,

    /// Set while a capture runs; every capture gets a fresh flag
    capturing: Arc<AtomicBool>,

    listener: Option<JoinHandle<()>>,
}

/// Translate a bus message into an event for capture `capture_id`
///
/// Returns `None` for messages of other captures, unparseable payloads and
/// unwanted partial results. A capture that ended maps to `End`.
fn interpret(
    subject: &str,
    payload: &[u8],
    capture_id: &str,
    interim_results: bool,
) -> Option<RecognitionEvent> {
    if subject.starts_with("stt.text.") {
        let transcript = match serde_json::from_slice::<TranscriptMessage>(payload) {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to parse transcript message: {}", e);
                return None;
            }
        };
        if transcript.session_id != capture_id || (transcript.partial && !interim_results) {
            return None;
        }
        let mut alternatives = vec![transcript.text];
        alternatives.extend(transcript.alternatives);
        return Some(RecognitionEvent::Results(vec![alternatives]));
    }

    let status = match serde_json::from_slice::<CaptureStatusMessage>(payload) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to parse capture status message: {}", e);
            return None;
        }
    };
    if status.session_id != capture_id {
        return None;
    }
    Some(match status.state {
        CaptureState::Error => {
            RecognitionEvent::Error(status.error.unwrap_or_else(|| "capture failed".to_string()))
        }
        CaptureState::Ended => RecognitionEvent::End,
    })
}

impl NatsRecognitionHandle {
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn abort_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }

    async fn listen(
        &self,
        capture_id: String,
        events: RecognitionEventSink,
        capturing: Arc<AtomicBool>,
    ) -> Result<JoinHandle<()>> {
        let transcripts = self.client.subscribe(subjects::TRANSCRIPTS).await?;
        let statuses = self.client.subscribe(subjects::CAPTURE_STATUS).await?;
        let mut messages = futures::stream::select(transcripts, statuses);
        let interim_results = self.options.interim_results;

        Ok(tokio::spawn(async move {
            debug!("Capture listener started for {}", capture_id);

            while let Some(msg) = messages.next().await {
                let Some(event) =
                    interpret(&msg.subject, &msg.payload, &capture_id, interim_results)
                else {
                    continue;
                };
                match event {
                    RecognitionEvent::End => break,
                    RecognitionEvent::Error(_) => {
                        events.emit(event);
                        break;
                    }
                    results => {
                        events.emit(results);
                    }
                }
            }

            capturing.store(false, Ordering::SeqCst);
            events.emit(RecognitionEvent::End);
            debug!("Capture listener stopped for {}", capture_id);
        }))
    }
}

#[async_trait::async_trait]
impl RecognitionHandle for NatsRecognitionHandle {
    async fn start(&mut self) -> Result<()> {
        if self.is_capturing() {
            bail!("Capture already in progress");
        }
        self.abort_listener();

        let capture_id = format!("console-{}", uuid::Uuid::new_v4());
        let capturing = Arc::new(AtomicBool::new(true));
        let events = self.events.begin_capture();

        // Subscribe before requesting capture so no result is missed
        let listener = self
            .listen(capture_id.clone(), events, Arc::clone(&capturing))
            .await?;

        let request = CaptureStartMessage {
            session_id: capture_id.clone(),
            language: self.options.locale.clone(),
            interim_results: self.options.interim_results,
            max_alternatives: self.options.max_alternatives,
            timestamp: Utc::now().to_rfc3339(),
        };
        if let Err(e) = self.client.publish_json(subjects::CAPTURE_START, &request).await {
            listener.abort();
            return Err(e).context("Failed to request capture");
        }

        info!("Capture {} requested ({})", capture_id, self.options.locale);
        self.capturing = capturing;
        self.listener = Some(listener);
        self.capture_id = Some(capture_id);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.is_capturing() {
            bail!("No capture in progress");
        }
        let Some(capture_id) = self.capture_id.clone() else {
            bail!("No capture in progress");
        };

        let request = CaptureStopMessage {
            session_id: capture_id,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.client
            .publish_json(subjects::CAPTURE_STOP, &request)
            .await
            .context("Failed to request capture stop")?;

        // The listener stays up to deliver the final transcript
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn release(&mut self) {
        self.abort_listener();
        self.capturing.store(false, Ordering::SeqCst);
        self.capture_id = None;
    }

    fn name(&self) -> &str {
        "nats"
    }
}

impl Drop for NatsRecognitionHandle {
    fn drop(&mut self) {
        self.abort_listener();
    }
}

pub struct NatsUtteranceChannel {
    client: NatsClient,
}

#[async_trait::async_trait]
impl UtteranceChannel for NatsUtteranceChannel {
    async fn speak(&mut self, utterance: Utterance) -> Result<()> {
        let message = SpeakMessage {
            text: utterance.text,
            language: utterance.locale,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.client.publish_json(subjects::SPEAK, &message).await
    }

    async fn cancel_all(&mut self) -> Result<()> {
        self.client
            .publish_json(subjects::CANCEL, &serde_json::json!({}))
            .await
    }

    fn name(&self) -> &str {
        "nats"
    }
}
