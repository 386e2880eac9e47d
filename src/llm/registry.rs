//! Backend construction from configuration

use super::{LlmError, LlmService, LoggingService, OpenAIService};
use crate::config::{env_parse, env_string};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the chat-completion backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Base URL of an `OpenAI`-compatible API (e.g., a self-hosted gateway)
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("OPENAI_API_KEY"),
            base_url: env_string("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: env_string("MEDASSIST_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: env_parse("MEDASSIST_TEMPERATURE", DEFAULT_TEMPERATURE),
            timeout: Duration::from_secs(env_parse(
                "MEDASSIST_LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )),
        }
    }

    /// Whether a usable credential is present
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Outcome of constructing the chat backend at startup
pub enum LlmBackend {
    Ready(Arc<dyn LlmService>),
    /// No credential configured; nothing was constructed
    MissingKey,
    /// A credential is present but the client could not be built
    Failed(LlmError),
}

impl LlmBackend {
    pub fn service(&self) -> Option<&Arc<dyn LlmService>> {
        match self {
            LlmBackend::Ready(service) => Some(service),
            LlmBackend::MissingKey | LlmBackend::Failed(_) => None,
        }
    }
}

impl From<Arc<dyn LlmService>> for LlmBackend {
    fn from(service: Arc<dyn LlmService>) -> Self {
        LlmBackend::Ready(service)
    }
}

/// Build the backend for `config`, validating prerequisites first.
///
/// The factory is not invoked without a credential, so nothing is
/// constructed that could reach the network. The created service is wrapped
/// with logging.
pub fn build_backend<F>(config: &LlmConfig, factory: F) -> LlmBackend
where
    F: FnOnce(&str, &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError>,
{
    if !config.has_api_key() {
        return LlmBackend::MissingKey;
    }
    let api_key = config.api_key.as_deref().map(str::trim).unwrap_or_default();

    match factory(api_key, config) {
        Ok(service) => LlmBackend::Ready(Arc::new(LoggingService::new(service))),
        Err(e) => {
            tracing::error!(error = %e, model = %config.model, "Failed to create LLM backend");
            LlmBackend::Failed(e)
        }
    }
}

/// Build the production `OpenAI`-compatible backend
pub fn openai_backend(config: &LlmConfig) -> LlmBackend {
    build_backend(config, |api_key, config| {
        let service: Arc<dyn LlmService> = Arc::new(OpenAIService::new(api_key, config)?);
        Ok(service)
    })
}
