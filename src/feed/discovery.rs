use super::html::scan_page;
use super::resolver::PublicOnlyResolver;
use super::services::match_service;
use super::{FeedCandidate, FeedFinder, FinderError, FindOptions};
use crate::util::{strip_control_chars, validate_url};
use async_trait::async_trait;
use futures::{future, stream, StreamExt};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// Paths tried under the page URL when probing for feeds.
const WELL_KNOWN_PATHS: &[&str] = &[
    "atom.xml",
    "feed.xml",
    "rss.xml",
    "index.xml",
    "atom.json",
    "feed.json",
    "rss.json",
    "index.json",
    "feed/",
    "rss/",
];

/// Maximum probes in flight at once for a single lookup.
const PROBE_CONCURRENCY: usize = 4;
const MAX_REDIRECTS: usize = 3;

const ACCEPT_ANY_FEED: &str = "application/rss+xml, application/atom+xml, application/feed+json, \
     application/xml;q=0.9, text/xml;q=0.9, text/html;q=0.8, */*;q=0.5";

/// Tunables for [`HttpFeedFinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderSettings {
    /// Budget for each outbound request, body included.
    pub request_timeout: Duration,
    /// Largest body read from any single response.
    pub max_response_bytes: usize,
    /// Whether to try the well-known feed paths under the page URL.
    pub probe_well_known: bool,
    /// Skips the private-address check. Only for local development and tests.
    pub allow_private_hosts: bool,
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(3),
            max_response_bytes: 5 * 1024 * 1024, // 5MB
            probe_well_known: true,
            allow_private_hosts: false,
        }
    }
}

/// Feed discovery over HTTP.
///
/// Lookup order:
/// 1. Known services (GitHub, Reddit) answer from the URL alone.
/// 2. The page is fetched and scanned for feed `<link>` tags and for `<a>`
///    tags mentioning RSS. If it has neither, the page itself is tried as a feed.
/// 3. Well-known paths under the page URL are probed.
///
/// A failure to fetch the page is only reported when nothing else turned up.
pub struct HttpFeedFinder {
    client: reqwest::Client,
    settings: FinderSettings,
}

impl HttpFeedFinder {
    /// Builds a finder with its own HTTP client.
    ///
    /// Unless private hosts are allowed, host names are resolved through
    /// [`PublicOnlyResolver`] so a public name cannot lead to an internal address.
    pub fn new(settings: FinderSettings) -> Result<Self, FinderError> {
        let mut builder = reqwest::Client::builder()
            .redirect(create_redirect_policy(settings.allow_private_hosts))
            .pool_max_idle_per_host(PROBE_CONCURRENCY)
            .pool_idle_timeout(Duration::from_secs(30));
        if !settings.allow_private_hosts {
            builder = builder.dns_resolver(PublicOnlyResolver::default());
        }
        let client = builder.build()?;
        Ok(Self { client, settings })
    }

    fn check_url(&self, url: &str) -> Result<Url, FinderError> {
        if self.settings.allow_private_hosts {
            return Url::parse(url)
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"))
                .ok_or_else(|| FinderError::InvalidUrl(url.to_owned()));
        }
        validate_url(url).map_err(|e| FinderError::InvalidUrl(e.to_string()))
    }

    /// GETs a URL and reads the body under the size and time limits.
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FinderError> {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, ACCEPT_ANY_FEED);

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FinderError::HttpStatus(status.as_u16()));
            }
            read_limited(response, self.settings.max_response_bytes).await
        };

        tokio::time::timeout(self.settings.request_timeout, exchange)
            .await
            .map_err(|_| FinderError::Timeout)?
    }

    /// Scans the page for feed links, or treats the page as a feed.
    async fn from_page(
        &self,
        page: &Url,
        user_agent: &str,
    ) -> Result<Vec<FeedCandidate>, FinderError> {
        let bytes = self.fetch(page.as_str(), user_agent).await?;
        let html = String::from_utf8_lossy(&bytes);

        let scan = scan_page(&html, page.as_str());
        let mut feeds = scan.feeds;
        let anchors = scan.anchors;
        if !anchors.is_empty() {
            let probes = anchors
                .into_iter()
                .map(|(text, link)| (link, Some(text)))
                .collect();
            feeds.extend(self.probe_all(probes, user_agent).await);
        }

        if feeds.is_empty() {
            if let Some(title) = parse_feed_title(&bytes) {
                tracing::debug!(url = %page, "Page is itself a feed");
                feeds.push(FeedCandidate::new(title, page.as_str()));
            }
        }

        Ok(feeds)
    }

    async fn from_well_known(&self, page: &Url, user_agent: &str) -> Vec<FeedCandidate> {
        let mut base = page.clone();
        base.set_query(None);
        base.set_fragment(None);
        let base = base.as_str().trim_end_matches('/').to_owned();

        let probes = WELL_KNOWN_PATHS
            .iter()
            .map(|suffix| (format!("{base}/{suffix}"), None))
            .collect();
        self.probe_all(probes, user_agent).await
    }

    /// Fetches candidate links concurrently, keeping those that parse as feeds.
    ///
    /// Results keep the input order.
    async fn probe_all(
        &self,
        probes: Vec<(String, Option<String>)>,
        user_agent: &str,
    ) -> Vec<FeedCandidate> {
        stream::iter(probes)
            .map(|(link, fallback)| self.probe(link, fallback, user_agent))
            .buffered(PROBE_CONCURRENCY)
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn probe(
        &self,
        link: String,
        fallback_title: Option<String>,
        user_agent: &str,
    ) -> Option<FeedCandidate> {
        if let Err(e) = self.check_url(&link) {
            tracing::debug!(link = %link, error = %e, "Skipping probe");
            return None;
        }

        match self.fetch(&link, user_agent).await {
            Ok(bytes) => {
                let title = parse_feed_title(&bytes)?;
                let title = if title.is_empty() {
                    fallback_title.unwrap_or_default()
                } else {
                    title
                };
                Some(FeedCandidate::new(title, link))
            }
            Err(e) => {
                tracing::debug!(link = %link, error = %e, "Probe failed");
                None
            }
        }
    }
}

#[async_trait]
impl FeedFinder for HttpFeedFinder {
    async fn find(
        &self,
        url: &str,
        options: &FindOptions,
    ) -> Result<Vec<FeedCandidate>, FinderError> {
        let page = self.check_url(url)?;

        if let Some(feeds) = match_service(&page) {
            tracing::debug!(url = %page, count = feeds.len(), "Matched known service");
            return Ok(feeds);
        }

        let from_page = self.from_page(&page, &options.user_agent).await;
        let from_well_known = if self.settings.probe_well_known {
            self.from_well_known(&page, &options.user_agent).await
        } else {
            Vec::new()
        };

        match from_page {
            Ok(mut feeds) => {
                feeds.extend(from_well_known);
                Ok(feeds)
            }
            Err(e) if !from_well_known.is_empty() => {
                tracing::warn!(url = %page, error = %e, "Page fetch failed, using well-known paths");
                Ok(from_well_known)
            }
            Err(e) => Err(e),
        }
    }
}

/// Redirect policy with a hop limit, loop detection and, unless private hosts
/// are allowed, the same address checks as the initial URL.
fn create_redirect_policy(allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        // previous() holds the original URL plus every hop already followed
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        if !allow_private_hosts {
            if let Err(e) = validate_url(url.as_str()) {
                return attempt.error(e);
            }
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len(),
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Streams the body, giving up once it passes `limit` bytes.
async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, FinderError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(FinderError::TooLarge);
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FinderError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Title of the feed in `bytes`, or `None` if they are not a feed.
///
/// An untitled feed gives `Some("")`.
fn parse_feed_title(bytes: &[u8]) -> Option<String> {
    let feed = feed_rs::parser::parse(bytes).ok()?;
    let title = feed.title.map(|t| t.content).unwrap_or_default();
    Some(strip_control_chars(title.trim()).trim().to_owned())
}
