//! HTTP API for MedAssist
//!
//! Every endpoint answers 200 with a JSON body; failures surface as reply text.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::chat::ChatOrchestrator;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(chat: ChatOrchestrator) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }
}
