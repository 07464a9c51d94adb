pub mod client;
pub mod invalidator;
pub mod messages;
pub mod speech;

pub use client::NatsClient;
pub use invalidator::NatsInvalidator;
pub use messages::{CaptureStatusMessage, TranscriptMessage};
pub use speech::NatsSpeechPlatform;
