//! Speech capture session management

mod manager;

pub use manager::{RecognitionManager, RecognitionState};
