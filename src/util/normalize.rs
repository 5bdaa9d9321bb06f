use thiserror::Error;
use url::Url;

/// Errors produced when user input cannot be turned into an absolute URL.
///
/// The `Display` text of each variant is user-facing: the server returns it
/// verbatim in a 400 body and the terminal client shows it in the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Input was empty or whitespace only.
    #[error("URL is required")]
    MissingUrl,
    /// Input could not be parsed as an absolute URL, even with a scheme added.
    #[error("Invalid URL format")]
    InvalidUrl,
}

/// Normalizes raw user input into an absolute URL string.
///
/// Trims surrounding whitespace, prepends `https://` unless the input already
/// starts with `http://` or `https://` (ASCII case-insensitive), then checks
/// that the result parses as an absolute URL. The returned string is the
/// candidate itself, not the parser's serialization, so `example.com` becomes
/// `https://example.com` without a trailing slash.
///
/// # Errors
///
/// - [`NormalizeError::MissingUrl`] for empty or whitespace-only input
/// - [`NormalizeError::InvalidUrl`] when the candidate fails to parse
///
/// # Examples
///
/// ```
/// use rss_finder::util::{normalize, NormalizeError};
///
/// assert_eq!(normalize("  example.com ").unwrap(), "https://example.com");
/// assert_eq!(normalize("http://example.com/blog").unwrap(), "http://example.com/blog");
/// assert_eq!(normalize("   "), Err(NormalizeError::MissingUrl));
/// assert_eq!(normalize("not a url"), Err(NormalizeError::InvalidUrl));
/// ```
pub fn normalize(raw: &str) -> Result<String, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::MissingUrl);
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    Url::parse(&candidate).map_err(|_| NormalizeError::InvalidUrl)?;
    Ok(candidate)
}

fn has_http_scheme(s: &str) -> bool {
    starts_with_ignore_ascii_case(s, "http://") || starts_with_ignore_ascii_case(s, "https://")
}

fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
