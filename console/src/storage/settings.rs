//! Settings file management

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Environment variable overriding `api.base_url`
pub const URL_ENV_VAR: &str = "PUBCONSOLE_URL";

/// Environment variable overriding `log_level`
pub const LOG_LEVEL_ENV_VAR: &str = "PUBCONSOLE_LOG_LEVEL";

/// Console settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Optional directory for a rolling log file
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Publishing API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Upload configuration
    #[serde(default)]
    pub upload: UploadSettings,

    /// App list configuration
    #[serde(default)]
    pub list: ListSettings,
}

/// Publishing API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the admin service, including any path prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Upload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Size of the chunks the bundle is streamed in
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    64 * 1024
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// App list settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSettings {
    /// How long the invalidate control shows its acknowledgement
    #[serde(default = "default_ack_millis")]
    pub ack_millis: u64,
}

fn default_ack_millis() -> u64 {
    1500
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            ack_millis: default_ack_millis(),
        }
    }
}

impl ListSettings {
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_millis)
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it is absent
    pub async fn load(file: &File) -> Result<Self, ConsoleError> {
        if !file.exists().await {
            debug!("No settings file at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }

        file.read_json::<Settings>().await.map_err(|e| {
            ConsoleError::ConfigError(format!(
                "unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }

    /// Apply environment overrides
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConsoleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV_VAR).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR).filter(|v| !v.is_empty()) {
            self.log_level = level.parse().map_err(ConsoleError::ConfigError)?;
        }
        Ok(())
    }

    /// Apply command line overrides (`--url=`, `--log-level=`)
    pub fn apply_cli(&mut self, cli_args: &HashMap<String, String>) -> Result<(), ConsoleError> {
        if let Some(url) = cli_args.get("url") {
            self.api.base_url = url.clone();
        }
        if let Some(level) = cli_args.get("log-level") {
            self.log_level = level.parse().map_err(ConsoleError::ConfigError)?;
        }
        Ok(())
    }

    /// Resolve the effective settings: file, then environment, then command line
    pub async fn resolve<F>(
        file: &File,
        lookup: F,
        cli_args: &HashMap<String, String>,
    ) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::load(file)
            .await
            .with_context(|| format!("loading settings from {}", file.path().display()))?;
        settings
            .apply_env(lookup)
            .context("applying environment overrides")?;
        settings
            .apply_cli(cli_args)
            .context("applying command line overrides")?;
        settings.validate().context("validating settings")?;
        Ok(settings)
    }

    /// Reject values that would make the console unusable
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.upload.chunk_size == 0 {
            return Err(ConsoleError::ConfigError(
                "upload.chunk_size must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.api.base_url).map_err(|e| {
            ConsoleError::ConfigError(format!("invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        Ok(())
    }
}
