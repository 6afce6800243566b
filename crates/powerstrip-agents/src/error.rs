//! Installer errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while placing or registering the job definitions.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Job definition file is not present in the source directory.
    #[error("Job definition not found: {0}")]
    SourceMissing(PathBuf),

    /// The LaunchAgents directory could not be created or written.
    #[error("Destination not writable at {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while copying a job definition.
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// launchctl refused to load a job definition.
    #[error("launchctl rejected {path}: {reason}")]
    RegistrationRejected { path: PathBuf, reason: String },

    /// launchctl list exited unsuccessfully.
    #[error("Failed to list services: {0}")]
    ListFailed(String),

    /// The service manager binary could not be executed.
    #[error("Failed to execute {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external call did not return within the configured bound.
    #[error("Command '{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// No home directory to derive the LaunchAgents directory from.
    #[error("Home directory could not be determined")]
    HomeDirUnavailable,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
