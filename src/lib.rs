pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod console;
pub mod error;
pub mod feedback;
pub mod http;
pub mod nats;
pub mod platform;
pub mod recognition;
pub mod submission;

pub use agent::{HttpCommandExecutor, NatsCommandExecutor};
pub use bootstrap::build_console;
pub use config::ConsoleConfig;
pub use console::{
    ConsoleAction, ConsoleController, ConsoleEvent, ConsoleHandle, ConsoleSnapshot,
    ControllerOptions,
};
pub use error::ConsoleError;
pub use feedback::{FeedbackState, FeedbackSynthesizer};
pub use http::{create_router, AppState};
pub use platform::{
    RecognitionEvent, RecognitionHandle, SpeechPlatform, SpeechSupport, UnsupportedPlatform,
    UtteranceChannel,
};
pub use recognition::{RecognitionManager, RecognitionState};
pub use submission::{
    CommandExecutor, CommandResult, Invalidator, SubmissionPipeline, SubmissionRequest,
    SubmissionStatus,
};
