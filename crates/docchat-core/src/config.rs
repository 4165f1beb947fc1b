use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocchatError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
/// `{query}` is replaced with the raw query text.
pub const DEFAULT_WEB_SEARCH_ENDPOINT: &str = "https://api.example.com/search?q={query}";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// API keys for the two remote services of a session.
///
/// Both keys are required. The value is immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    openai_api_key: String,
    tavily_api_key: String,
}

impl Credentials {
    pub fn new(openai_api_key: impl Into<String>, tavily_api_key: impl Into<String>) -> Result<Self> {
        let openai_api_key = openai_api_key.into().trim().to_string();
        let tavily_api_key = tavily_api_key.into().trim().to_string();

        if openai_api_key.is_empty() {
            return Err(DocchatError::not_configured("OpenAI API key is empty"));
        }
        if tavily_api_key.is_empty() {
            return Err(DocchatError::not_configured("Tavily API key is empty"));
        }

        Ok(Self {
            openai_api_key,
            tavily_api_key,
        })
    }

    pub fn openai_api_key(&self) -> &str {
        &self.openai_api_key
    }

    pub fn tavily_api_key(&self) -> &str {
        &self.tavily_api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .finish()
    }
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<ApiKeyConfig>,
    #[serde(default)]
    pub tavily: Option<ApiKeyConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiKeyConfig {
    pub api_key: String,
}

/// Tunables read from `config.toml`. Every field is optional in the file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub openai_base_url: String,
    pub tavily_endpoint: String,
    pub web_search_endpoint: String,
    pub poll_interval_ms: u64,
    /// `None` waits until the run finishes, however long that takes.
    pub max_poll_attempts: Option<u32>,
    /// Upper bound for a single HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            tavily_endpoint: DEFAULT_TAVILY_ENDPOINT.to_string(),
            web_search_endpoint: DEFAULT_WEB_SEARCH_ENDPOINT.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ChatSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
