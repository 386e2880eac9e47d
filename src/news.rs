//! Live medical news retrieval
//!
//! Fetches a handful of headlines from a news-search RSS feed. Every failure
//! (network, timeout, HTTP status, malformed XML) degrades to an empty list so
//! the caller has exactly one "no data" path to handle.

pub mod feed;

pub use feed::{parse_feed, FeedError};

use crate::config::{env_parse, env_string};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of items handed to the generator
pub const MAX_NEWS_ITEMS: usize = 5;
/// Qualifier appended to every user query
const DOMAIN_QUALIFIER: &str = "medical news";
/// Source label used when a feed item names none
pub const DEFAULT_SOURCE: &str = "Google News";

/// A single headline from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub publication_date: String,
    pub source: String,
}

/// Anything that can produce news items for a query
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch at most [`MAX_NEWS_ITEMS`] items, in feed order.
    ///
    /// Never fails: any error yields an empty list.
    async fn fetch_news(&self, query: &str) -> Vec<NewsItem>;
}

/// Settings for the RSS feed client
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub feed_url: String,
    pub timeout: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            feed_url: env_string("MEDASSIST_NEWS_FEED_URL")
                .unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            timeout: Duration::from_secs(env_parse(
                "MEDASSIST_NEWS_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )),
        }
    }
}

/// Why a fetch produced nothing
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("feed request timed out: {0}")]
    Timeout(String),
    #[error("feed request failed: {0}")]
    Network(String),
    #[error("feed returned HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Parse(#[from] FeedError),
}

impl From<reqwest::Error> for NewsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NewsError::Timeout(e.to_string())
        } else {
            NewsError::Network(e.to_string())
        }
    }
}

/// Build the search terms sent to the feed
pub fn feed_query(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        DOMAIN_QUALIFIER.to_string()
    } else {
        format!("{query} {DOMAIN_QUALIFIER}")
    }
}

/// Google News RSS search client
pub struct RssNewsSource {
    client: Client,
    feed_url: String,
}

impl RssNewsSource {
    pub fn new(config: &NewsConfig) -> Result<Self, NewsError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            feed_url: config.feed_url.clone(),
        })
    }

    async fn try_fetch(&self, query: &str) -> Result<Vec<NewsItem>, NewsError> {
        let response = self
            .client
            .get(&self.feed_url)
            .query(&[
                ("q", feed_query(query).as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_feed(&body, MAX_NEWS_ITEMS)?)
    }
}

#[async_trait]
impl NewsSource for RssNewsSource {
    async fn fetch_news(&self, query: &str) -> Vec<NewsItem> {
        let start = std::time::Instant::now();
        match self.try_fetch(query).await {
            Ok(items) => {
                tracing::info!(
                    items = items.len(),
                    duration_ms = %start.elapsed().as_millis(),
                    "News feed fetched"
                );
                items
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    duration_ms = %start.elapsed().as_millis(),
                    "News feed unavailable"
                );
                Vec::new()
            }
        }
    }
}
