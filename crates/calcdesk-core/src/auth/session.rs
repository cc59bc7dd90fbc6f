use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::TokenResponse;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// A stored bearer token. There is no expiry tracking: a stale token is
/// discovered when the server rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl SessionData {
    pub fn from_login(token: TokenResponse, username: impl Into<String>) -> Self {
        Self {
            token: token.access_token,
            token_type: token.token_type,
            username: Some(username.into()),
            created_at: Utc::now(),
        }
    }
}

/// In-memory token mirrored to `session.json`.
pub struct Session {
    dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, data: None }
    }

    /// Load session from disk. Returns whether a token was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;

        if data.token.is_empty() {
            return Ok(false);
        }

        debug!(username = ?data.username, "Session restored");
        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create session directory")?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(&path, contents)
                .context("Failed to write session file")?;
        }
        Ok(())
    }

    /// Clear session data in memory and on disk
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if one is held
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.username.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> TokenResponse {
        TokenResponse {
            access_token: "tok-123".to_string(),
            token_type: "bearer".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.is_authenticated());
        session.update(SessionData::from_login(token(), "alice"));
        session.save().unwrap();

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(restored.load().unwrap());
        assert_eq!(restored.token(), Some("tok-123"));
        assert_eq!(restored.username(), Some("alice"));
        assert!(restored.is_authenticated());
    }

    #[test]
    fn test_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.load().unwrap());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path().join("nested"));
        session.update(SessionData::from_login(token(), "alice"));
        session.save().unwrap();
        assert!(dir.path().join("nested").join(SESSION_FILE).exists());

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert!(!dir.path().join("nested").join(SESSION_FILE).exists());

        // Clearing twice is fine
        session.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        assert!(session.load().is_err());
        assert!(!session.is_authenticated());
    }
}
