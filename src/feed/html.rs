//! HTML scanning for feed links.
//!
//! Pages are untrusted and often malformed, so they go through `scraper`'s
//! HTML5 parser. We only need `<title>`, `<link>` tags in the head and `<a>`
//! tags in the body.

use super::FeedCandidate;
use crate::util::strip_control_chars;
use scraper::{ElementRef, Html, Selector};

/// `type` attribute values that mark a `<link>` as a feed.
const FEED_LINK_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/json",
    "application/feed+json",
];

/// Upper bound on `<a>` tags whose targets get probed.
const MAX_SUSPECTED_ANCHORS: usize = 8;

/// What a page offers: declared feeds and anchors worth probing.
#[derive(Debug, Default)]
pub(super) struct PageScan {
    pub feeds: Vec<FeedCandidate>,
    /// `(anchor text, absolute href)` pairs.
    pub anchors: Vec<(String, String)>,
}

/// Parses the page once and collects its feed links and RSS anchors.
pub(super) fn scan_page(html: &str, base_url: &str) -> PageScan {
    let document = Html::parse_document(html);
    PageScan {
        feeds: find_feed_links(&document, base_url),
        anchors: find_rss_anchors(&document, base_url),
    }
}

/// Extracts feed `<link>` tags from the document head.
///
/// Titles come from the tag's `title` attribute, falling back to the page
/// `<title>`. Links are resolved against `base_url`. Document order is kept.
fn find_feed_links(document: &Html, base_url: &str) -> Vec<FeedCandidate> {
    let Ok(selector) = Selector::parse("head link[type]") else {
        return Vec::new();
    };
    let page_title = page_title(document).unwrap_or_default();

    document
        .select(&selector)
        .filter_map(|link| {
            let element = link.value();
            let kind = element.attr("type")?.trim();
            if !FEED_LINK_TYPES.iter().any(|t| kind.eq_ignore_ascii_case(t)) {
                return None;
            }
            let href = element.attr("href").map(str::trim).filter(|h| !h.is_empty())?;
            let title = element
                .attr("title")
                .map(clean_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| page_title.clone());
            Some(FeedCandidate::new(title, resolve_url(href, base_url)))
        })
        .collect()
}

/// Finds `<a>` tags in the body whose text mentions "rss".
///
/// Returns `(anchor text, absolute href)` pairs, deduplicated by href and
/// capped at [`MAX_SUSPECTED_ANCHORS`]. These are only suspects: the caller
/// must fetch each one to confirm it is a feed.
fn find_rss_anchors(document: &Html, base_url: &str) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("body a[href]") else {
        return Vec::new();
    };
    let mut suspects: Vec<(String, String)> = Vec::new();

    for anchor in document.select(&selector) {
        let text = element_text(anchor);
        if !text.to_lowercase().contains("rss") {
            continue;
        }
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let link = resolve_url(href, base_url);
        if suspects.iter().any(|(_, l)| *l == link) {
            continue;
        }
        suspects.push((text, link));
        if suspects.len() >= MAX_SUSPECTED_ANCHORS {
            break;
        }
    }

    suspects
}

/// Text of the first `<title>` element, cleaned up.
fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = element_text(document.select(&selector).next()?);
    (!title.is_empty()).then_some(title)
}

/// Resolves a potentially relative URL against a base URL.
fn resolve_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }

    // Protocol-relative: go through the parser so userinfo and dot segments are normalized
    if href.starts_with("//") {
        if let Ok(parsed) = url::Url::parse(&format!("https:{href}")) {
            return parsed.to_string();
        }
    }

    if let Ok(base) = url::Url::parse(base_url) {
        if let Ok(resolved) = base.join(href) {
            return resolved.to_string();
        }
    }

    href.to_owned()
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Strips control characters and collapses whitespace.
fn clean_text(s: &str) -> String {
    strip_control_chars(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
