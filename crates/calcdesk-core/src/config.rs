//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the server URL and the last used username.
//!
//! Configuration is stored at `~/.config/calcdesk/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;

/// Application name used for config/data directory paths
const APP_NAME: &str = "calcdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured server
pub const SERVER_URL_ENV: &str = "CALCDESK_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub server_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Location of `config.json`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the stored session and log files
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Resolve the server URL: explicit override, then config, then default.
    ///
    /// The override is usually the `--server` flag or `CALCDESK_URL`.
    pub fn server_url(&self, override_url: Option<&str>) -> String {
        override_url
            .filter(|u| !u.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            server_url: Some("http://calc.local:9000".to_string()),
            last_username: Some("alice".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_server_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.server_url(None), DEFAULT_BASE_URL);

        config.server_url = Some("http://from-config".to_string());
        assert_eq!(config.server_url(None), "http://from-config");
        assert_eq!(config.server_url(Some("http://from-flag")), "http://from-flag");
        assert_eq!(config.server_url(Some("  ")), "http://from-config");
    }
}
