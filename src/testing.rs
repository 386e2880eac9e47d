//! Mock implementations for testing
//!
//! These mocks let the orchestrator and handlers run without network I/O.

use crate::llm::{ContentBlock, LlmError, LlmRequest, LlmResponse, LlmService, Usage};
use crate::news::{NewsItem, NewsSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A plain text completion
pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::text(text)],
        usage: Usage::default(),
    }
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    delay: Option<Duration>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to widen race windows in concurrency tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Static News Source
// ============================================================================

/// News source returning a fixed list and recording queries
pub struct StaticNewsSource {
    items: Vec<NewsItem>,
    queries: Mutex<Vec<String>>,
}

impl StaticNewsSource {
    pub fn new(items: Vec<NewsItem>) -> Self {
        Self {
            items,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A source that behaves like a failed fetch
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch_news(&self, query: &str) -> Vec<NewsItem> {
        self.queries.lock().unwrap().push(query.to_string());
        self.items.clone()
    }
}

/// A news item with predictable fields
pub fn news_item(n: usize) -> NewsItem {
    NewsItem {
        title: format!("Study {n} finds new diabetes marker"),
        link: format!("https://journal.example.org/articles/{n}?ref=rss"),
        publication_date: format!("Mon, 0{n} Jan 2024 09:00:00 GMT"),
        source: format!("Journal {n}"),
    }
}
