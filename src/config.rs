//! Configuration file parser for `~/.config/rss-finder/config.toml`.
//!
//! The file is optional; a missing or empty file yields `Config::default()`.
//! Every key has a default, so any subset can be given. Unknown keys are
//! accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::controller::ControllerSettings;
use crate::feed::{
    dedup_feeds, DedupKey, FeedCandidate, FinderSettings, FindOptions, DEFAULT_USER_AGENT,
};
use crate::theme::ThemeVariant;

/// Environment variable that overrides `server.user_agent`.
pub const USER_AGENT_ENV: &str = "USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeVariant,
    pub server: ServerConfig,
    pub client: ClientConfig,
    /// Action name → key string, e.g. `copy_link = "c"`.
    pub keybindings: HashMap<String, String>,
}

/// Settings for `serve` and `find`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_response_bytes: usize,
    pub probe_well_known: bool,
    /// Lets discovery fetch loopback and private addresses. Off unless you
    /// are pointing it at a local test server.
    pub allow_private_hosts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let finder = FinderSettings::default();
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: finder.request_timeout.as_secs(),
            max_response_bytes: finder.max_response_bytes,
            probe_well_known: finder.probe_well_known,
            allow_private_hosts: finder.allow_private_hosts,
        }
    }
}

impl ServerConfig {
    pub fn finder_settings(&self) -> FinderSettings {
        FinderSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            max_response_bytes: self.max_response_bytes,
            probe_well_known: self.probe_well_known,
            allow_private_hosts: self.allow_private_hosts,
        }
    }

    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub debounce_ms: u64,
    pub dedup: DedupKey,
    /// 0 = no client-side timeout.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".to_string(),
            debounce_ms: 800,
            dedup: DedupKey::default(),
            request_timeout_secs: 0,
        }
    }
}

impl ClientConfig {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            dedup: self.dedup,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Collapses repeated results with the configured dedup key.
    pub fn dedup_feeds(&self, feeds: Vec<FeedCandidate>) -> Vec<FeedCandidate> {
        dedup_feeds(feeds, self.dedup)
    }
}

const KNOWN_TOP_LEVEL: &[&str] = &["theme", "server", "client", "keybindings"];
const KNOWN_SERVER: &[&str] = &[
    "bind",
    "user_agent",
    "request_timeout_secs",
    "max_response_bytes",
    "probe_well_known",
    "allow_private_hosts",
];
const KNOWN_CLIENT: &[&str] = &["api_url", "debounce_ms", "dedup", "request_timeout_secs"];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Loads configuration from a TOML file.
    ///
    /// - Missing or blank file → defaults
    /// - Invalid TOML or wrong value types → `ConfigError::Parse`
    /// - Unknown keys → accepted, logged as warnings
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(path = %path.display(), theme = config.theme.name(), "Loaded configuration");
        Ok(config)
    }

    /// Parses TOML text, warning about unknown keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        for key in unknown_keys(content) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }

        Ok(toml::from_str(content)?)
    }

    /// Applies environment overrides through `lookup` (normally
    /// `std::env::var`). Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(user_agent = %agent, "User agent overridden from environment");
            self.server.user_agent = agent.trim().to_string();
        }
    }
}

/// Dotted paths of keys that no config field reads.
fn unknown_keys(content: &str) -> Vec<String> {
    let Ok(raw) = content.parse::<toml::Table>() else {
        // toml::from_str will report the syntax error
        return Vec::new();
    };

    let mut unknown = Vec::new();
    for (key, value) in &raw {
        let known_nested = match key.as_str() {
            "server" => Some(KNOWN_SERVER),
            "client" => Some(KNOWN_CLIENT),
            _ => None,
        };
        if !KNOWN_TOP_LEVEL.contains(&key.as_str()) {
            unknown.push(key.clone());
        } else if let (Some(known), Some(table)) = (known_nested, value.as_table()) {
            unknown.extend(
                table
                    .keys()
                    .filter(|k| !known.contains(&k.as_str()))
                    .map(|k| format!("{key}.{k}")),
            );
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeVariant::Dark);
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.server.user_agent, "rss-finder/2.0");
        assert_eq!(config.server.request_timeout_secs, 3);
        assert_eq!(config.server.max_response_bytes, 5 * 1024 * 1024);
        assert!(config.server.probe_well_known);
        assert!(!config.server.allow_private_hosts);
        assert_eq!(config.client.api_url, "http://127.0.0.1:3000");
        assert_eq!(config.client.debounce_ms, 800);
        assert_eq!(config.client.dedup, DedupKey::TitleAndLink);
        assert_eq!(config.client.request_timeout(), None);
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/rss_finder_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.client.debounce_ms, 800);
    }

    #[test]
    fn test_blank_file_returns_default() {
        let dir = std::env::temp_dir().join("rss_finder_config_test_blank");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, ThemeVariant::Dark);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
theme = "light"

[server]
bind = "0.0.0.0:8080"
user_agent = "my-finder/1.0"
request_timeout_secs = 10
max_response_bytes = 1024
probe_well_known = false

[client]
api_url = "http://finder.internal:8080"
debounce_ms = 300
dedup = "link"
request_timeout_secs = 15

[keybindings]
copy_link = "c"
"#,
        )
        .unwrap();

        assert_eq!(config.theme, ThemeVariant::Light);
        assert_eq!(config.server.bind.port(), 8080);

        let finder = config.server.finder_settings();
        assert_eq!(finder.request_timeout, Duration::from_secs(10));
        assert_eq!(finder.max_response_bytes, 1024);
        assert!(!finder.probe_well_known);
        assert_eq!(config.server.find_options().user_agent, "my-finder/1.0");

        let controller = config.client.controller_settings();
        assert_eq!(controller.debounce, Duration::from_millis(300));
        assert_eq!(controller.dedup, DedupKey::Link);
        assert_eq!(config.client.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(
            config.keybindings.get("copy_link").map(String::as_str),
            Some("c")
        );
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::parse("[client]\ndebounce_ms = 100\n").unwrap();
        assert_eq!(config.client.debounce_ms, 100);
        assert_eq!(config.client.api_url, "http://127.0.0.1:3000");
        assert_eq!(config.server.user_agent, "rss-finder/2.0");
    }

    #[test]
    fn test_dedup_feeds_uses_configured_key() {
        let feeds = vec![
            FeedCandidate::new("Posts", "https://example.com/feed.xml"),
            FeedCandidate::new("All posts", "https://example.com/feed.xml"),
        ];

        let config = Config::parse("[client]\ndedup = \"link\"\n").unwrap();
        assert_eq!(
            config.client.dedup_feeds(feeds.clone()),
            vec![FeedCandidate::new("Posts", "https://example.com/feed.xml")]
        );

        assert_eq!(Config::default().client.dedup_feeds(feeds.clone()), feeds);
    }

    #[test]
    fn test_zero_timeout_clamped_for_finder() {
        let config = Config::parse("[server]\nrequest_timeout_secs = 0\n").unwrap();
        assert_eq!(
            config.server.finder_settings().request_timeout,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("[client]\ndebounce_ms = \"fast\"\n").is_err());
        assert!(Config::parse("theme = \"solarized\"\n").is_err());
        assert!(Config::parse("[server]\nbind = \"not an address\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted_and_reported() {
        let content = r#"
totally_fake_key = 1
[server]
bind = "127.0.0.1:3000"
typo_timeout = 5
[client]
api_ur = "x"
"#;
        assert!(Config::parse(content).is_ok());
        let mut unknown = unknown_keys(content);
        unknown.sort();
        assert_eq!(
            unknown,
            vec!["client.api_ur", "server.typo_timeout", "totally_fake_key"]
        );
    }

    #[test]
    fn test_env_overrides_user_agent() {
        let mut config = Config::default();
        config.apply_env(|name| (name == USER_AGENT_ENV).then(|| "env-agent/3.0".to_string()));
        assert_eq!(config.server.user_agent, "env-agent/3.0");
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.server.user_agent, "rss-finder/2.0");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("rss_finder_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
