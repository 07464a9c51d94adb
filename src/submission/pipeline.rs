use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::executor::{CommandExecutor, Invalidator};
use super::types::{CommandResult, RequestId, Settlement, SubmissionRequest, SubmissionStatus};
use crate::error::submission_error_message;

/// Sends commands to the command service and tracks the latest request
///
/// Every submission runs on its own task and reports a `Settlement` through
/// the channel given at construction. Only the most recently created request
/// drives the exposed state: an older request that settles late is logged
/// and discarded.
pub struct SubmissionPipeline {
    executor: Arc<dyn CommandExecutor>,
    invalidator: Arc<dyn Invalidator>,

    /// Views refreshed after each successful command
    scopes: Arc<Vec<String>>,

    settlements: mpsc::UnboundedSender<Settlement>,

    /// Next request ID (creation order)
    next_id: RequestId,

    /// Most recently created request
    latest: Option<SubmissionRequest>,
}

impl SubmissionPipeline {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        invalidator: Arc<dyn Invalidator>,
        scopes: Vec<String>,
        settlements: mpsc::UnboundedSender<Settlement>,
    ) -> Self {
        Self {
            executor,
            invalidator,
            scopes: Arc::new(scopes),
            settlements,
            next_id: 1,
            latest: None,
        }
    }

    /// Submit a command
    ///
    /// Blank commands are ignored and return `None`. Otherwise a fresh
    /// pending request replaces the latest one and its ID is returned.
    pub fn submit(&mut self, command_text: &str) -> Option<RequestId> {
        let command = command_text.trim();
        if command.is_empty() {
            debug!("Ignoring blank command");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.latest = Some(SubmissionRequest::pending(id, command.to_string()));

        info!("Submitting command #{} via {}: {}", id, self.executor.name(), command);

        let executor = Arc::clone(&self.executor);
        let invalidator = Arc::clone(&self.invalidator);
        let scopes = Arc::clone(&self.scopes);
        let settlements = self.settlements.clone();
        let command = command.to_string();

        tokio::spawn(async move {
            let outcome = match executor.execute(&command).await {
                Ok(result) => Ok(result),
                Err(e) => {
                    warn!("Command #{} failed: {:#}", id, e);
                    Err(submission_error_message(&e))
                }
            };
            let succeeded = outcome.is_ok();

            if settlements.send(Settlement { id, outcome }).is_err() {
                debug!("Console gone before command #{} settled", id);
            }

            if succeeded {
                if let Err(e) = invalidator.invalidate(&scopes).await {
                    error!("Failed to invalidate views after command #{}: {:#}", id, e);
                }
            }
        });

        Some(id)
    }

    /// Record a settlement
    ///
    /// Returns true when it updated the latest request.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        let Some(latest) = self.latest.as_mut().filter(|r| r.id == settlement.id) else {
            info!("Discarding stale result for command #{}", settlement.id);
            return false;
        };
        if !latest.is_pending() {
            warn!("Command #{} already settled", settlement.id);
            return false;
        }

        latest.settled_at = Some(Utc::now());
        match settlement.outcome {
            Ok(result) => {
                info!(
                    "Command #{} succeeded: {}",
                    latest.id,
                    result.message.as_deref().unwrap_or("(no message)")
                );
                latest.status = SubmissionStatus::Succeeded;
                latest.result = Some(result);
            }
            Err(message) => {
                latest.status = SubmissionStatus::Failed;
                latest.error_message = Some(message);
            }
        }
        true
    }

    pub fn latest(&self) -> Option<&SubmissionRequest> {
        self.latest.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.latest.as_ref().is_some_and(SubmissionRequest::is_pending)
    }

    pub fn last_result(&self) -> Option<&CommandResult> {
        self.latest.as_ref().and_then(|r| r.result.as_ref())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.latest.as_ref().and_then(|r| r.error_message.as_deref())
    }
}
