use anyhow::Result;
use chrono::Utc;

use super::client::{subjects, NatsClient};
use super::messages::InvalidateMessage;
use crate::submission::Invalidator;

/// Broadcasts invalidated scopes on `console.invalidate`
pub struct NatsInvalidator {
    client: NatsClient,
}

impl NatsInvalidator {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Invalidator for NatsInvalidator {
    async fn invalidate(&self, scopes: &[String]) -> Result<()> {
        let message = InvalidateMessage {
            scopes: scopes.to_vec(),
            timestamp: Utc::now().to_rfc3339(),
        };
        self.client.publish_json(subjects::INVALIDATE, &message).await
    }
}
