//! Session configuration, loaded from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::error::{QuestError, Result};

/// Settings for one tutor session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    /// Login name of the simulated user; the home directory derives from it.
    pub username: String,
    /// Simulated machine name shown in the prompt and `hostname`.
    pub hostname: String,
    /// Maximum number of history entries retained by the shell.
    pub history_size: usize,
    /// Let text commands read piped output when no file operand is given.
    pub pipe_stdin: bool,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            username: "user".to_string(),
            hostname: "quest".to_string(),
            history_size: 100,
            pipe_stdin: false,
        }
    }
}

impl QuestConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    /// Malformed TOML is a [`QuestError::TomlParse`]; well-formed but
    /// unusable values are a [`QuestError::Config`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.username.contains('/') {
            return Err(QuestError::Config(format!(
                "invalid username: {:?}",
                self.username
            )));
        }
        if self.hostname.is_empty() {
            return Err(QuestError::Config("hostname must not be empty".to_string()));
        }
        if self.history_size == 0 {
            return Err(QuestError::Config(
                "history_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
