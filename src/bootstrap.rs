//! Assemble a console from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::agent::{HttpCommandExecutor, NatsCommandExecutor};
use crate::config::{AgentTransport, ConsoleConfig, SpeechBackend};
use crate::console::{ConsoleController, ConsoleHandle, ControllerOptions};
use crate::nats::{NatsClient, NatsInvalidator, NatsSpeechPlatform};
use crate::platform::{SpeechPlatform, UnsupportedPlatform};
use crate::submission::{CommandExecutor, Invalidator, LogInvalidator};

/// Build a controller wired to the collaborators the config names
///
/// NATS is only dialed when the agent transport or the speech backend needs
/// it; when connected, successful commands are also broadcast as
/// invalidations.
pub async fn build_console(config: &ConsoleConfig) -> Result<(ConsoleController, ConsoleHandle)> {
    let needs_nats = config.agent.transport == AgentTransport::Nats
        || config.speech.backend == SpeechBackend::Nats;
    let nats = if needs_nats {
        Some(
            NatsClient::connect(&config.nats.url)
                .await
                .context("Failed to connect to NATS")?,
        )
    } else {
        None
    };

    let executor: Arc<dyn CommandExecutor> = match (config.agent.transport, &nats) {
        (AgentTransport::Nats, Some(client)) => Arc::new(NatsCommandExecutor::new(
            client.clone(),
            config.agent_timeout(),
        )),
        _ => Arc::new(HttpCommandExecutor::new(
            &config.agent.url,
            config.agent_timeout(),
        )?),
    };
    info!("Command executor: {}", executor.name());

    let invalidator: Arc<dyn Invalidator> = match &nats {
        Some(client) => Arc::new(NatsInvalidator::new(client.clone())),
        None => Arc::new(LogInvalidator),
    };

    let platform: Box<dyn SpeechPlatform> = match (config.speech.backend, &nats) {
        (SpeechBackend::Nats, Some(client)) => Box::new(NatsSpeechPlatform::new(client.clone())),
        _ => Box::new(UnsupportedPlatform),
    };

    Ok(ConsoleController::new(
        ControllerOptions::from(config),
        platform.as_ref(),
        executor,
        invalidator,
    ))
}
