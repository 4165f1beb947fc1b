//! Loads [`ChatSettings`] from `config.toml`.

use std::fs;
use std::path::PathBuf;

use docchat_core::config::ChatSettings;
use docchat_core::{DocchatError, Result};

/// Configuration service reading the optional settings file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_file: PathBuf,
}

impl ConfigService {
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
        }
    }

    /// Returns the settings, or the defaults when the file does not exist.
    pub fn load(&self) -> Result<ChatSettings> {
        if !self.config_file.exists() {
            tracing::debug!(
                "No settings file at {}, using defaults",
                self.config_file.display()
            );
            return Ok(ChatSettings::default());
        }

        let content = fs::read_to_string(&self.config_file)?;
        let settings: ChatSettings = toml::from_str(&content)?;

        if settings.poll_interval_ms == 0 {
            return Err(DocchatError::config("poll_interval_ms must be greater than 0"));
        }
        if settings.max_poll_attempts == Some(0) {
            return Err(DocchatError::config(
                "max_poll_attempts must be greater than 0 (omit it to wait without limit)",
            ));
        }
        if settings.request_timeout_secs == 0 {
            return Err(DocchatError::config("request_timeout_secs must be greater than 0"));
        }
        if !settings.web_search_endpoint.contains("{query}") {
            return Err(DocchatError::config(
                "web_search_endpoint must contain a {query} placeholder",
            ));
        }

        Ok(settings)
    }
}
