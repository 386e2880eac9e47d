//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to answer a chat turn
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    /// Base64 image, bare or as a data URL
    pub image: Option<String>,
}

/// Request to forget a session
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClearRequest {
    pub session_id: Option<String>,
}

/// Response for a chat turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Response for simple actions
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Liveness and configuration summary
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub status: String,
    pub message: String,
    /// `None` when no credential is configured
    pub model: Option<String>,
    pub llm_configured: bool,
    pub sessions: usize,
}
