use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ConsoleError;
use crate::submission::{CommandExecutor, CommandResult};

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    command: &'a str,
}

/// Error body returned by the agent service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Sends commands to `POST {base_url}/agent`
pub struct HttpCommandExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCommandExecutor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/agent", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pick the most useful message out of a failed reply
fn rejection_message(status: StatusCode, body: Option<ErrorBody>) -> String {
    let detail = body.and_then(|b| b.detail).and_then(|detail| match detail {
        Value::String(text) => Some(text),
        Value::Null => None,
        other => Some(other.to_string()),
    });

    detail
        .filter(|d| !d.trim().is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl CommandExecutor for HttpCommandExecutor {
    async fn execute(&self, command: &str) -> Result<CommandResult> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AgentRequest { command })
            .send()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            return Err(ConsoleError::Rejected(rejection_message(status, body)).into());
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;
        CommandResult::from_value(value)
    }

    fn name(&self) -> &str {
        "http"
    }
}
