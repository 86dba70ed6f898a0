//! Error types for the Weatherfy core.
//!
//! Errors carry full context for logging and expose `user_message()` for
//! anything shown in the UI.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory could not be determined")]
    NoConfigDir,

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "Settings location unavailable. Using defaults.",
            ConfigError::Read { .. } => "Settings could not be read. Using defaults.",
            ConfigError::Write { .. } => "Settings could not be saved.",
            ConfigError::Parse(_) => "Settings file is malformed. Check your settings.",
            ConfigError::Serialize(_) => "Settings could not be saved.",
            ConfigError::Invalid(_) => "Invalid settings. Check your configuration.",
        }
    }
}
