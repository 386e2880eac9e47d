//! Per-session conversation history
//!
//! History lives only for the lifetime of the process. Reads return a bounded
//! window of the most recent turns; raw history keeps growing up to a hard
//! per-session cap, and the number of sessions is capped with
//! least-recently-used eviction.

use crate::config::env_parse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Number of turns handed to the generator as context
pub const HISTORY_WINDOW: usize = 10;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Storage for conversation turns, keyed by session
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The most recent [`HISTORY_WINDOW`] turns, oldest first.
    ///
    /// Unseen sessions read as empty and are not created.
    async fn read(&self, session_key: &str) -> Vec<Turn>;

    /// Append a turn, creating the session on first use
    async fn append(&self, session_key: &str, turn: Turn);

    /// Drop the session entirely
    async fn clear(&self, session_key: &str);

    /// Number of live sessions
    async fn session_count(&self) -> usize;
}

/// Bounds on memory held by the in-memory store
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub max_sessions: usize,
    /// Never below [`HISTORY_WINDOW`], so the read window is always complete
    pub max_turns_per_session: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            max_turns_per_session: 200,
        }
    }
}

impl StoreLimits {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_sessions: env_parse("MEDASSIST_MAX_SESSIONS", defaults.max_sessions),
            max_turns_per_session: env_parse(
                "MEDASSIST_MAX_TURNS_PER_SESSION",
                defaults.max_turns_per_session,
            ),
        }
        .normalized()
    }

    fn normalized(self) -> Self {
        Self {
            max_sessions: self.max_sessions.max(1),
            max_turns_per_session: self.max_turns_per_session.max(HISTORY_WINDOW),
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    turns: Mutex<VecDeque<Turn>>,
    /// Logical clock value of the last read or append, for LRU eviction
    last_touched: AtomicU64,
}

/// Process-local store backed by a map of independently locked sessions
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    limits: StoreLimits,
    clock: AtomicU64,
}

impl InMemoryConversationStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limits: limits.normalized(),
            clock: AtomicU64::new(0),
        }
    }

    fn touch(&self, session: &Session) {
        let now = self.clock.fetch_add(1, Ordering::Relaxed);
        session.last_touched.fetch_max(now, Ordering::Relaxed);
    }

    async fn get_or_create(&self, session_key: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(session_key) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(session_key) {
            return Arc::clone(session);
        }

        if sessions.len() >= self.limits.max_sessions {
            Self::evict_oldest(&mut sessions);
        }

        let session = Arc::new(Session::default());
        sessions.insert(session_key.to_string(), Arc::clone(&session));
        session
    }

    /// Recency is an atomic, so this never waits on a session's turn lock.
    fn evict_oldest(sessions: &mut HashMap<String, Arc<Session>>) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, session)| session.last_touched.load(Ordering::Relaxed))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            sessions.remove(&key);
            tracing::info!(session = %key, "Evicted least recently used session");
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn read(&self, session_key: &str) -> Vec<Turn> {
        let Some(session) = self.sessions.read().await.get(session_key).cloned() else {
            return Vec::new();
        };
        self.touch(&session);
        let turns = session.turns.lock().await;
        let skip = turns.len().saturating_sub(HISTORY_WINDOW);
        turns.iter().skip(skip).cloned().collect()
    }

    async fn append(&self, session_key: &str, turn: Turn) {
        let session = self.get_or_create(session_key).await;
        self.touch(&session);
        let mut turns = session.turns.lock().await;
        turns.push_back(turn);
        while turns.len() > self.limits.max_turns_per_session {
            turns.pop_front();
        }
    }

    async fn clear(&self, session_key: &str) {
        self.sessions.write().await.remove(session_key);
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
