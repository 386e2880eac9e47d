//! Process configuration read from the environment
//!
//! Every setting has a default; an unset credential or an unparseable value
//! never stops the server from starting.

use crate::llm::LlmConfig;
use crate::news::NewsConfig;
use crate::store::StoreLimits;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 5000;

/// Top-level configuration assembled at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub llm: LlmConfig,
    pub news: NewsConfig,
    pub store: StoreLimits,
    /// Optional file overriding the built-in persona
    pub persona_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("MEDASSIST_PORT", DEFAULT_PORT),
            llm: LlmConfig::from_env(),
            news: NewsConfig::from_env(),
            store: StoreLimits::from_env(),
            persona_file: env_string("MEDASSIST_PERSONA_FILE").map(PathBuf::from),
        }
    }
}

/// Read a non-empty environment variable
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or malformed.
pub fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = env_string(name) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse() {
        value
    } else {
        tracing::warn!(variable = name, value = %raw, default = %default, "Ignoring unparseable setting");
        default
    }
}
