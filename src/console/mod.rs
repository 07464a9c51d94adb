//! The voice command console
//!
//! `ConsoleController` is an actor: hosts send `ConsoleAction`s through a
//! `ConsoleHandle` and watch `ConsoleSnapshot`s, while the controller folds
//! recognition events, submission settlements and its clear timer into the
//! same event loop.

mod controller;
mod snapshot;
mod timer;

pub use controller::{ConsoleController, ConsoleEvent, ControllerOptions};
pub use snapshot::{ConsoleAction, ConsoleHandle, ConsoleSnapshot, SAMPLE_COMMANDS};
pub use timer::ClearTimer;
