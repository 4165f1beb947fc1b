//! Secret loading.
//!
//! API keys come from `secret.json` first and fall back to the
//! `OPENAI_API_KEY` / `TAVILY_API_KEY` environment variables.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use docchat_core::config::{Credentials, SecretConfig};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Loads API keys from the secret file or the environment.
#[derive(Debug, Clone)]
pub struct SecretService {
    secret_file: PathBuf,
}

impl SecretService {
    pub fn new(secret_file: impl Into<PathBuf>) -> Self {
        Self {
            secret_file: secret_file.into(),
        }
    }

    /// Reads `secret.json`. A missing file yields an empty config.
    pub fn load_file(&self) -> Result<SecretConfig> {
        if !self.secret_file.exists() {
            return Ok(SecretConfig::default());
        }

        let content = fs::read_to_string(&self.secret_file).with_context(|| {
            format!(
                "Failed to read secret file at {}",
                self.secret_file.display()
            )
        })?;

        serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse secret file at {}",
                self.secret_file.display()
            )
        })
    }

    /// Resolves both keys, returning `None` unless both are available.
    pub fn load_credentials(&self) -> Result<Option<Credentials>> {
        self.load_credentials_with(|name| std::env::var(name).ok())
    }

    /// Same as [`load_credentials`](Self::load_credentials) with an injectable
    /// environment lookup.
    pub fn load_credentials_with<F>(&self, env: F) -> Result<Option<Credentials>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets = self.load_file()?;

        let openai = secrets
            .openai
            .map(|c| c.api_key)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(OPENAI_API_KEY_ENV));
        let tavily = secrets
            .tavily
            .map(|c| c.api_key)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(TAVILY_API_KEY_ENV));

        match (openai, tavily) {
            (Some(openai), Some(tavily)) => match Credentials::new(openai, tavily) {
                Ok(credentials) => Ok(Some(credentials)),
                Err(err) => {
                    tracing::warn!("Ignoring configured API keys: {}", err);
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }
}
