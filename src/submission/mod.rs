//! Command submission
//!
//! Typed or spoken commands go to a `CommandExecutor` on their own task;
//! results come back as `Settlement`s, and successful commands trigger a
//! fire-and-forget `Invalidator` notification.

mod executor;
mod pipeline;
mod types;

pub use executor::{CommandExecutor, Invalidator, LogInvalidator};
pub use pipeline::SubmissionPipeline;
pub use types::{CommandResult, RequestId, Settlement, SubmissionRequest, SubmissionStatus};
