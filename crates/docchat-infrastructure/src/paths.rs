//! Path management for docchat configuration files.
//!
//! ```text
//! ~/.config/docchat/
//! ├── config.toml    # Chat settings (optional)
//! └── secret.json    # API keys (optional)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// Resolves the locations of the configuration files.
#[derive(Debug, Clone)]
pub struct DocchatPaths {
    config_dir: PathBuf,
}

impl DocchatPaths {
    /// Uses `base` when given, otherwise `~/.config/docchat`.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let config_dir = match base {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("Cannot find home directory"))?
                .join(".config")
                .join("docchat"),
        };
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Ensure this file has 600 permissions; it holds API keys.
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }
}
