use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::platform::RecognitionOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub nats: NatsConfig,
    pub speech: SpeechConfig,
    pub console: ControllerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// How commands reach the remote agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentTransport {
    Http,
    Nats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the agent service (HTTP transport)
    pub url: String,
    pub transport: AgentTransport,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    pub url: String,
}

/// Which speech services back the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Text-only operation
    None,
    /// Capture and synthesis services reached over NATS
    Nats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub backend: SpeechBackend,
    pub locale: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Delay before a voice-originated command is cleared from the input
    pub clear_delay_ms: u64,
    /// Views refreshed after every successful command
    pub invalidate_scopes: Vec<String>,
}

impl ConsoleConfig {
    /// Load configuration from an optional file plus `VOICE_CONSOLE__*` overrides.
    ///
    /// Every key has a default, so a missing file yields a usable text-only console.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "voice-console")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8700)?
            .set_default("agent.url", "http://localhost:8000")?
            .set_default("agent.transport", "http")?
            .set_default("agent.timeout_ms", 15_000)?
            .set_default("nats.url", "nats://localhost:4222")?
            .set_default("speech.backend", "none")?
            .set_default("speech.locale", "es-ES")?
            .set_default("speech.interim_results", false)?
            .set_default("speech.max_alternatives", 1)?
            .set_default("console.clear_delay_ms", 200)?
            .set_default(
                "console.invalidate_scopes",
                vec!["inventory", "employees", "reminders"],
            )?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("VOICE_CONSOLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn recognition_options(&self) -> RecognitionOptions {
        RecognitionOptions {
            locale: self.speech.locale.clone(),
            interim_results: self.speech.interim_results,
            max_alternatives: self.speech.max_alternatives,
        }
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.console.clear_delay_ms)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_millis(self.agent.timeout_ms)
    }
}
