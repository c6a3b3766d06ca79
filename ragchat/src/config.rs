//! Configuration loading.
//!
//! Reads `~/.ragchat/config.toml` when present; every field has a default so a
//! missing file or a partial one is fine. Command-line flags override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::session::SessionOptions;

const CONFIG_DIR: &str = ".ragchat";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub timeouts: TimeoutConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub chat_secs: u64,
    pub upload_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chat_secs: 30,
            upload_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub retain_attachment_on_failure: bool,
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<String>,
    pub chat_timeout: Option<u64>,
    pub upload_timeout: Option<u64>,
    pub retain_attachment: bool,
}

/// Validated settings the application runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub session: SessionOptions,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(ref backend) = overrides.backend {
            self.backend.base_url.clone_from(backend);
        }
        if let Some(secs) = overrides.chat_timeout {
            self.timeouts.chat_secs = secs;
        }
        if let Some(secs) = overrides.upload_timeout {
            self.timeouts.upload_secs = secs;
        }
        if overrides.retain_attachment {
            self.session.retain_attachment_on_failure = true;
        }
        self
    }

    /// Validate and convert into runtime settings.
    pub fn resolve(&self) -> Result<Settings> {
        let base_url = Url::parse(&self.backend.base_url)
            .with_context(|| format!("Invalid backend URL '{}'", self.backend.base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("Backend URL must be http or https: {base_url}");
        }

        if self.timeouts.chat_secs == 0 || self.timeouts.upload_secs == 0 {
            bail!("Timeouts must be at least one second");
        }

        Ok(Settings {
            base_url,
            session: SessionOptions {
                chat_timeout: Duration::from_secs(self.timeouts.chat_secs),
                upload_timeout: Duration::from_secs(self.timeouts.upload_secs),
                retain_attachment_on_failure: self.session.retain_attachment_on_failure,
            },
        })
    }
}
