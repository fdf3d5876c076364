//! Bearer-token sources.
//!
//! The token is issued by the authentication module and persisted in a
//! session file. It is read on every request so a re-login is picked up
//! without restarting.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Supplies the bearer token attached to every API request.
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` when no session is available.
    fn token(&self) -> Option<String>;
}

/// A fixed token, e.g. from `PREVIX_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        let token = self.0.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// Persisted session written by the authentication module.
#[derive(Debug, Deserialize)]
struct StoredSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// Reads the token from a JSON session file (`{"access_token": "..."}`).
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenProvider for SessionFile {
    fn token(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "No session file");
                return None;
            }
        };
        match parse_session(&raw) {
            Some(token) => Some(token),
            None => {
                tracing::warn!(path = %self.path.display(), "Session file has no access token");
                None
            }
        }
    }
}

/// Extract the access token from a session document.
///
/// Accepts either a JSON object with `access_token` (or `token`) or a bare
/// token string.
pub fn parse_session(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        let session: StoredSession = serde_json::from_str(trimmed).ok()?;
        let non_blank = |t: Option<String>| {
            t.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
        };
        return non_blank(session.access_token).or_else(|| non_blank(session.token));
    }
    Some(trimmed.trim_matches('"').to_string())
}
