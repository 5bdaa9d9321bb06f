//! Feed discovery types and the discovery collaborator.
//!
//! - [`FeedCandidate`] is the `{title, link}` pair exchanged between the
//!   collaborator, the HTTP endpoint and the client.
//! - [`FeedFinder`] is the seam the endpoint calls through; it treats any
//!   implementation as opaque.
//! - [`HttpFeedFinder`] is the default implementation: known-service
//!   shortcuts, page-source scanning, then well-known path probing.
//! - [`dedup_feeds`] collapses repeated candidates before rendering.

mod discovery;
mod html;
mod resolver;
mod services;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub use discovery::{FinderSettings, HttpFeedFinder};

/// User agent sent with every discovery request unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "rss-finder/2.0";

/// A feed link discovered for a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedCandidate {
    /// Human-readable title; empty when the source provided none.
    #[serde(default)]
    pub title: String,
    /// Absolute URL of the feed.
    pub link: String,
}

impl FeedCandidate {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Options passed to the collaborator on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    /// Identifying `User-Agent` for outbound requests.
    pub user_agent: String,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Errors that can occur during feed discovery.
///
/// None of these are shown to end users; the endpoint logs them and answers
/// with a generic message.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The URL failed validation (SSRF policy, bad scheme, etc.)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// HTTP request failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response for the page itself
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("response too large")]
    TooLarge,
    /// The discovery task panicked or was cancelled
    #[error("discovery task failed: {0}")]
    Task(String),
}

/// The external feed-discovery collaborator.
///
/// Implementations own their timeout and retry policy; callers impose none.
#[async_trait]
pub trait FeedFinder: Send + Sync {
    /// Finds feeds for an already-normalized absolute URL.
    async fn find(
        &self,
        url: &str,
        options: &FindOptions,
    ) -> Result<Vec<FeedCandidate>, FinderError>;
}

/// Which fields make two candidates "the same" when deduplicating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// Same title and same link.
    #[default]
    TitleAndLink,
    /// Same link, whatever the title.
    Link,
}

/// Removes repeated candidates, keeping the first occurrence of each key.
pub fn dedup_feeds(feeds: Vec<FeedCandidate>, key: DedupKey) -> Vec<FeedCandidate> {
    let mut seen: HashSet<(Option<String>, String)> = HashSet::with_capacity(feeds.len());
    feeds
        .into_iter()
        .filter(|feed| {
            let title = match key {
                DedupKey::TitleAndLink => Some(feed.title.clone()),
                DedupKey::Link => None,
            };
            seen.insert((title, feed.link.clone()))
        })
        .collect()
}
