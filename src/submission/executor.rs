use anyhow::Result;
use tracing::debug;

use super::types::CommandResult;

/// Remote service that interprets and executes a command
///
/// Implementations:
/// - `HttpCommandExecutor`: POST to the agent endpoint
/// - `NatsCommandExecutor`: request/reply over NATS
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute one command; errors carry a human-readable message
    async fn execute(&self, command: &str) -> Result<CommandResult>;

    /// Get executor name for logging
    fn name(&self) -> &str;
}

/// Notifies dependent views that their data changed
#[async_trait::async_trait]
pub trait Invalidator: Send + Sync {
    async fn invalidate(&self, scopes: &[String]) -> Result<()>;
}

/// Invalidator for hosts with no dependent views
#[derive(Debug, Clone, Copy, Default)]
pub struct LogInvalidator;

#[async_trait::async_trait]
impl Invalidator for LogInvalidator {
    async fn invalidate(&self, scopes: &[String]) -> Result<()> {
        debug!("Invalidated scopes: {}", scopes.join(", "));
        Ok(())
    }
}
