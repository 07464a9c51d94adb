//! Host speech capabilities
//!
//! The console never touches a speech engine directly. Everything goes
//! through `SpeechPlatform`, so hosts (and tests) inject what they have.

pub mod backend;
pub mod unsupported;

pub use backend::{
    RecognitionEvent, RecognitionEventSink, RecognitionHandle, RecognitionOptions, SpeechPlatform,
    SpeechSupport, TaggedRecognitionEvent, Utterance, UtteranceChannel,
};
pub use unsupported::UnsupportedPlatform;
