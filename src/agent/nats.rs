use anyhow::Result;
use serde_json::Value;
use std::time::Duration;

use crate::error::ConsoleError;
use crate::nats::client::{subjects, NatsClient};
use crate::nats::messages::{AgentCommandMessage, AgentErrorMessage};
use crate::submission::{CommandExecutor, CommandResult};

/// Sends commands as NATS requests on `agent.command`
///
/// The agent replies with the result object, or `{"error": "..."}`.
pub struct NatsCommandExecutor {
    client: NatsClient,
    timeout: Duration,
}

impl NatsCommandExecutor {
    pub fn new(client: NatsClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// Interpret an agent reply payload
pub fn parse_reply(payload: &[u8]) -> Result<CommandResult> {
    if let Ok(reply) = serde_json::from_slice::<AgentErrorMessage>(payload) {
        return Err(ConsoleError::Rejected(reply.error).into());
    }
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| ConsoleError::Transport(format!("invalid agent reply: {}", e)))?;
    CommandResult::from_value(value)
}

#[async_trait::async_trait]
impl CommandExecutor for NatsCommandExecutor {
    async fn execute(&self, command: &str) -> Result<CommandResult> {
        let request = AgentCommandMessage {
            command: command.to_string(),
        };
        let payload = self
            .client
            .request_json(subjects::AGENT_COMMAND, &request, self.timeout)
            .await
            .map_err(|e| ConsoleError::Transport(format!("{:#}", e)))?;

        parse_reply(&payload)
    }

    fn name(&self) -> &str {
        "nats"
    }
}
