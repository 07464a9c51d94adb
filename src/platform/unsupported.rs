use anyhow::Result;

use super::backend::{
    RecognitionEventSink, RecognitionHandle, RecognitionOptions, SpeechPlatform, SpeechSupport,
    UtteranceChannel,
};
use crate::error::ConsoleError;

/// Host without speech input or output; the console runs text-only
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl SpeechPlatform for UnsupportedPlatform {
    fn detect_support(&self) -> SpeechSupport {
        SpeechSupport::default()
    }

    fn create_session(
        &self,
        _options: RecognitionOptions,
        _events: RecognitionEventSink,
    ) -> Result<Box<dyn RecognitionHandle>> {
        Err(ConsoleError::CapabilityAbsent("speech recognition").into())
    }

    fn create_utterance_channel(&self) -> Result<Box<dyn UtteranceChannel>> {
        Err(ConsoleError::CapabilityAbsent("speech synthesis").into())
    }
}
