//! Installer configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, ConfigError};

/// What to do when a step of the install sequence fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Attempt every remaining step regardless.
    #[default]
    BestEffort,
    /// Stop at the first failing step.
    FailFast,
}

/// How job definitions are handed to launchctl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMode {
    /// `launchctl load <path>`
    #[default]
    Legacy,
    /// `launchctl bootstrap gui/<uid> <path>`
    Bootstrap,
}

/// Installer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Directory holding the two job definitions.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Destination directory. Defaults to `~/Library/LaunchAgents`.
    #[serde(default)]
    pub agents_dir: Option<PathBuf>,

    /// File name of the "on" job definition.
    #[serde(default = "default_on_job")]
    pub on_job: String,

    /// File name of the "off" job definition.
    #[serde(default = "default_off_job")]
    pub off_job: String,

    /// Substring matched against service labels in the final listing.
    #[serde(default = "default_label_filter")]
    pub label_filter: String,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub load_mode: LoadMode,

    /// Path to the launchctl binary.
    #[serde(default = "default_launchctl")]
    pub launchctl: PathBuf,

    /// Upper bound for each launchctl call (in seconds).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_on_job() -> String {
    "com.powerstrip.on.plist".to_string()
}

fn default_off_job() -> String {
    "com.powerstrip.off.plist".to_string()
}

fn default_label_filter() -> String {
    "com.powerstrip".to_string()
}

fn default_launchctl() -> PathBuf {
    PathBuf::from("launchctl")
}

fn default_command_timeout() -> u64 {
    30
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            agents_dir: None,
            on_job: default_on_job(),
            off_job: default_off_job(),
            label_filter: default_label_filter(),
            failure_policy: FailurePolicy::default(),
            load_mode: LoadMode::default(),
            launchctl: default_launchctl(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl InstallerConfig {
    /// Create a config reading job definitions from `dir`.
    pub fn with_source_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the destination directory.
    pub fn agents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.agents_dir = Some(dir.into());
        self
    }

    /// Set the on/off job file names.
    pub fn jobs(mut self, on: impl Into<String>, off: impl Into<String>) -> Self {
        self.on_job = on.into();
        self.off_job = off.into();
        self
    }

    /// Set the listing filter.
    pub fn label_filter(mut self, filter: impl Into<String>) -> Self {
        self.label_filter = filter.into();
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Set the launchctl binary.
    pub fn launchctl(mut self, program: impl Into<PathBuf>) -> Self {
        self.launchctl = program.into();
        self
    }

    pub fn command_timeout_secs(mut self, secs: u64) -> Self {
        self.command_timeout_secs = secs;
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Resolve the destination directory, falling back to the per-user
    /// LaunchAgents directory.
    pub fn resolve_agents_dir(&self) -> Result<PathBuf, AgentError> {
        match &self.agents_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|h| h.join("Library").join("LaunchAgents"))
                .ok_or(AgentError::HomeDirUnavailable),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_file_name("on_job", &self.on_job)?;
        validate_file_name("off_job", &self.off_job)?;
        if self.on_job == self.off_job {
            return Err(ConfigError::invalid(
                "off_job",
                "must differ from on_job",
            ));
        }
        if self.label_filter.trim().is_empty() {
            return Err(ConfigError::invalid("label_filter", "must not be empty"));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "command_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn validate_file_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(ConfigError::invalid(
            field,
            format!("'{}' is not a plain file name", name),
        ));
    }
    Ok(())
}

/// Loads [`InstallerConfig`] from TOML.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<InstallerConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load and validate configuration from a string.
    pub fn load_str(content: &str) -> Result<InstallerConfig, ConfigError> {
        let mut config: InstallerConfig = toml::from_str(content)?;
        config.source_dir = expand_path("source_dir", &config.source_dir)?;
        if let Some(dir) = config.agents_dir.take() {
            config.agents_dir = Some(expand_path("agents_dir", &dir)?);
        }
        config.launchctl = expand_path("launchctl", &config.launchctl)?;
        config.validate()?;
        Ok(config)
    }
}

/// Expand `~` and `$VAR` in a configured path.
fn expand_path(field: &str, path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| ConfigError::invalid(field, e.to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
