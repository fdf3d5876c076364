use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::session::{SessionFile, StaticToken, TokenProvider};

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API base URL without trailing slash (default: `http://localhost:8000`).
    pub api_url: String,
    /// Explicit bearer token; overrides the session file when set.
    pub access_token: Option<String>,
    /// Persisted session written by the auth module (default: `session.json`).
    pub session_file: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Search debounce quiet period in milliseconds (default: `1500`).
    pub search_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            access_token: None,
            session_file: PathBuf::from("session.json"),
            request_timeout_secs: 30,
            search_debounce_ms: 1500,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `PREVIX_API_URL`            | `http://localhost:8000` |
    /// | `PREVIX_ACCESS_TOKEN`       | --                      |
    /// | `PREVIX_SESSION_FILE`       | `session.json`          |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `PREVIX_SEARCH_DEBOUNCE_MS` | `1500`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("PREVIX_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let access_token = lookup("PREVIX_ACCESS_TOKEN").filter(|v| !v.trim().is_empty());

        let session_file = lookup("PREVIX_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let request_timeout_secs = parse_u64(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?;
        let search_debounce_ms = parse_u64(
            &lookup,
            "PREVIX_SEARCH_DEBOUNCE_MS",
            defaults.search_debounce_ms,
        )?;

        Ok(Self {
            api_url,
            access_token,
            session_file,
            request_timeout_secs,
            search_debounce_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Token source: the explicit token if configured, else the session file.
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        match &self.access_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(SessionFile::new(self.session_file.clone())),
        }
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected: "u64",
            value,
        }),
    }
}
