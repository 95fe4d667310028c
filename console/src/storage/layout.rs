//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::file::File;

/// Environment variable overriding the base directory
pub const HOME_ENV_VAR: &str = "PUBCONSOLE_HOME";

/// Storage layout for the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve the base directory from environment lookups
    ///
    /// `PUBCONSOLE_HOME` wins, then `$XDG_CONFIG_HOME/pubconsole`, then
    /// `$HOME/.config/pubconsole`, then `./.pubconsole`.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let base_dir = if let Some(home) = non_empty(HOME_ENV_VAR) {
            PathBuf::from(home)
        } else if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("pubconsole")
        } else if let Some(home) = non_empty("HOME").or_else(|| non_empty("USERPROFILE")) {
            PathBuf::from(home).join(".config").join("pubconsole")
        } else {
            PathBuf::from(".pubconsole")
        };

        Self::new(base_dir)
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("settings.json"))
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::from_env(|key| std::env::var(key).ok())
    }
}
