//! Turn orchestration
//!
//! Each incoming turn is classified, answered along exactly one path (news,
//! image or text), recorded in the session history and turned into a reply
//! string. No path fails: errors become user-facing text.

pub mod grounding;
pub mod route;

pub use route::Route;

use crate::news::NewsSource;
use crate::responder::{GenerationInput, ImageAttachment, ResponseGenerator};
use crate::store::{ConversationStore, Turn};
use chrono::Local;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::Instrument;

/// Session key used when the client sends none
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Reply for a news request when no live results could be fetched
pub const NEWS_UNAVAILABLE_MESSAGE: &str = "Live medical news is temporarily unavailable. Please try again later.\n\n*This chatbot provides general medical information only and is not a substitute for professional medical advice.*";

/// Prompt used for an image sent without text
pub const DEFAULT_IMAGE_PROMPT: &str = "Analyze this medical document.";

/// Reply when the attached image can't be decoded
pub const IMAGE_UNREADABLE_MESSAGE: &str = "I couldn't read the attached image. Please upload it again as a PNG, JPEG, GIF or WebP file.";

/// One inbound user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub session_key: String,
    pub message: String,
    /// Raw base64 payload or data URL
    pub image: Option<String>,
}

impl ChatTurn {
    /// Missing or blank fields fall back to defaults instead of failing the request
    pub fn new(session_key: Option<String>, message: Option<String>, image: Option<String>) -> Self {
        Self {
            session_key: session_key
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string()),
            message: message.unwrap_or_default(),
            image: image.filter(|i| !i.trim().is_empty()),
        }
    }

    pub fn route(&self) -> Route {
        route::classify(&self.message, self.image.is_some())
    }
}

/// Per-session mutexes so turns on one session never interleave
#[derive(Default)]
struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    async fn acquire(&self, session_key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on are dead weight
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(session_key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Drives a turn through classification, retrieval, generation and history
pub struct ChatOrchestrator {
    store: Arc<dyn ConversationStore>,
    news: Arc<dyn NewsSource>,
    generator: ResponseGenerator,
    locks: SessionLocks,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        news: Arc<dyn NewsSource>,
        generator: ResponseGenerator,
    ) -> Self {
        Self {
            store,
            news,
            generator,
            locks: SessionLocks::default(),
        }
    }

    /// Answer a turn. Always returns reply text.
    pub async fn handle_turn(&self, turn: ChatTurn) -> String {
        let route = turn.route();
        let span = tracing::info_span!(
            "chat_turn",
            request_id = %uuid::Uuid::new_v4(),
            session = %turn.session_key,
            route = route.as_str(),
        );

        async move {
            let _session = self.locks.acquire(&turn.session_key).await;
            let start = std::time::Instant::now();

            let reply = match route {
                Route::News => self.answer_news(&turn).await,
                Route::Image => self.answer_image(&turn).await,
                Route::Text => self.answer_text(&turn).await,
            };

            tracing::info!(
                duration_ms = %start.elapsed().as_millis(),
                reply_len = reply.len(),
                "Turn answered"
            );
            reply
        }
        .instrument(span)
        .await
    }

    /// Forget a session's history
    pub async fn clear(&self, session_key: &str) {
        let _session = self.locks.acquire(session_key).await;
        self.store.clear(session_key).await;
        tracing::info!(session = %session_key, "Session cleared");
    }

    pub fn generator(&self) -> &ResponseGenerator {
        &self.generator
    }

    pub async fn session_count(&self) -> usize {
        self.store.session_count().await
    }

    async fn answer_news(&self, turn: &ChatTurn) -> String {
        let items = self.news.fetch_news(&turn.message).await;

        let reply = if items.is_empty() {
            tracing::warn!("No live news available, refusing ungrounded answer");
            NEWS_UNAVAILABLE_MESSAGE.to_string()
        } else {
            let prompt =
                grounding::build_grounding_prompt(&turn.message, &items, Local::now().date_naive());
            let prompt_turn = [Turn::user(prompt)];
            self.generate(GenerationInput::Conversation(&prompt_turn)).await
        };

        self.store
            .append(&turn.session_key, Turn::user(turn.message.clone()))
            .await;
        self.store
            .append(&turn.session_key, Turn::assistant(reply.clone()))
            .await;
        reply
    }

    /// Vision turns are stateless: history is not read, and only the reply is
    /// recorded so image prompts stay out of the text history.
    async fn answer_image(&self, turn: &ChatTurn) -> String {
        let Some(raw) = turn.image.as_deref() else {
            return self.answer_text(turn).await;
        };

        let image = match ImageAttachment::decode(raw) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected image attachment");
                return IMAGE_UNREADABLE_MESSAGE.to_string();
            }
        };

        let text = if turn.message.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            turn.message.as_str()
        };

        let reply = self
            .generate(GenerationInput::Vision {
                text,
                image: &image,
            })
            .await;

        self.store
            .append(&turn.session_key, Turn::assistant(reply.clone()))
            .await;
        reply
    }

    async fn answer_text(&self, turn: &ChatTurn) -> String {
        self.store
            .append(&turn.session_key, Turn::user(turn.message.clone()))
            .await;
        let window = self.store.read(&turn.session_key).await;

        let reply = self.generate(GenerationInput::Conversation(&window)).await;

        self.store
            .append(&turn.session_key, Turn::assistant(reply.clone()))
            .await;
        reply
    }

    async fn generate(&self, input: GenerationInput<'_>) -> String {
        match self.generator.generate(input).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed, replying with error text");
                e.user_message()
            }
        }
    }
}
