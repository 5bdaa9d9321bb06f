//! Utility functions shared by the server and the terminal client.
//!
//! - **Normalization**: turn raw user input into an absolute URL
//! - **URL validation**: SSRF policy for server-side fetches, scheme checks for opening links
//! - **Text processing**: control-character stripping and width-aware truncation
//!
//! # Examples
//!
//! ```
//! use rss_finder::util::{normalize, truncate_to_width, validate_url};
//!
//! let url = normalize("example.com").unwrap();
//! assert!(validate_url(&url).is_ok());
//!
//! let shown = truncate_to_width("A very long feed title", 12);
//! ```

mod normalize;
mod text;
mod url_validator;

pub use normalize::{normalize, NormalizeError};
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{is_private_ip, validate_url, validate_url_for_open, UrlValidationError};

/// Maximum accepted length of the URL input field, in bytes.
pub const MAX_URL_INPUT_LENGTH: usize = 2048;
