use anyhow::{Context, Result};
use async_nats::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Subjects shared with the speech and agent services
pub mod subjects {
    pub const CAPTURE_START: &str = "stt.capture.start";
    pub const CAPTURE_STOP: &str = "stt.capture.stop";
    /// loqa-core publishes to stt.text.partial and stt.text.final
    pub const TRANSCRIPTS: &str = "stt.text.>";
    pub const CAPTURE_STATUS: &str = "stt.status.>";
    pub const SPEAK: &str = "tts.speak";
    pub const CANCEL: &str = "tts.cancel";
    pub const AGENT_COMMAND: &str = "agent.command";
    pub const INVALIDATE: &str = "console.invalidate";
}

#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Publish a JSON message
    pub async fn publish_json<T: Serialize>(&self, subject: &str, message: &T) -> Result<()> {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .with_context(|| format!("Failed to publish to {}", subject))?;

        debug!("Published to {}", subject);

        Ok(())
    }

    /// Send a JSON request and wait for the raw reply payload
    pub async fn request_json<T: Serialize>(
        &self,
        subject: &str,
        message: &T,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(message)?;

        let reply = tokio::time::timeout(
            timeout,
            self.client.request(subject.to_string(), payload.into()),
        )
        .await
        .with_context(|| format!("Request to {} timed out", subject))?
        .with_context(|| format!("Request to {} failed", subject))?;

        Ok(reply.payload.to_vec())
    }

    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .with_context(|| format!("Failed to subscribe to {}", subject))?;

        info!("Subscribed to {}", subject);

        Ok(subscriber)
    }
}
