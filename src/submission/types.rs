use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConsoleError;

/// Creation-ordered identifier of a submission
pub type RequestId = u64;

/// Successful reply from the command service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Human-readable confirmation, spoken back to the user when present
    pub message: Option<String>,

    /// Full reply object
    pub raw: Map<String, Value>,
}

impl CommandResult {
    /// Build a result from the service's JSON reply, which must be an object
    ///
    /// Any other reply is a `Transport` error: the service answered, but not
    /// with something the console understands.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(raw) = value else {
            return Err(ConsoleError::Transport(format!(
                "reply is not a JSON object: {}",
                value
            ))
            .into());
        };
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self { message, raw })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Succeeded,
    Failed,
}

/// One call to the command service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub id: RequestId,
    pub command_text: String,
    pub status: SubmissionStatus,
    pub result: Option<CommandResult>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl SubmissionRequest {
    pub(crate) fn pending(id: RequestId, command_text: String) -> Self {
        Self {
            id,
            command_text,
            status: SubmissionStatus::Pending,
            result: None,
            error_message: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }
}

/// Outcome of a submission, reported back to the pipeline's owner
#[derive(Debug, Clone)]
pub struct Settlement {
    pub id: RequestId,
    pub outcome: std::result::Result<CommandResult, String>,
}
