//! `launchctl` invocation (load, list).

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::listing::{ServiceEntry, parse_list_output};
use crate::config::{InstallerConfig, LoadMode};
use crate::error::AgentError;

/// Client side of the host service manager.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Ask the service manager to load the job definition at `plist`.
    async fn load(&self, plist: &Path) -> Result<(), AgentError>;

    /// List the services currently registered for the user.
    async fn list(&self) -> Result<Vec<ServiceEntry>, AgentError>;
}

/// [`ServiceManager`] backed by the `launchctl` binary.
#[derive(Debug, Clone)]
pub struct Launchctl {
    program: PathBuf,
    mode: LoadMode,
    timeout: Duration,
}

impl Launchctl {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            mode: LoadMode::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &InstallerConfig) -> Self {
        Self::new(&config.launchctl)
            .with_mode(config.load_mode)
            .with_timeout(config.command_timeout())
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments passed to launchctl to load `plist`.
    pub(super) fn load_args(&self, plist: &Path) -> Vec<String> {
        let path = plist.to_string_lossy().into_owned();
        match self.mode {
            LoadMode::Legacy => vec!["load".to_string(), path],
            LoadMode::Bootstrap => match gui_domain() {
                Some(domain) => vec!["bootstrap".to_string(), domain, path],
                None => {
                    tracing::warn!("bootstrap mode needs a unix user id, using launchctl load");
                    vec!["load".to_string(), path]
                }
            },
        }
    }

    /// Run launchctl with `args`, bounded by the configured timeout.
    async fn run(&self, args: &[String]) -> Result<Output, AgentError> {
        let command = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!("Running: {}", command);

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| AgentError::Timeout {
                command,
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| AgentError::CommandSpawn {
                program: self.program.display().to_string(),
                source: e,
            })
    }
}

impl Default for Launchctl {
    fn default() -> Self {
        Self::new("launchctl")
    }
}

#[async_trait]
impl ServiceManager for Launchctl {
    async fn load(&self, plist: &Path) -> Result<(), AgentError> {
        let output = self.run(&self.load_args(plist)).await?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // Legacy `load` reports some failures on stderr with a zero exit code.
        if !output.status.success() || stderr.contains("Load failed") {
            let reason = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            };
            return Err(AgentError::RegistrationRejected {
                path: plist.to_path_buf(),
                reason,
            });
        }

        if !stderr.is_empty() {
            tracing::warn!("launchctl: {}", stderr);
        }
        tracing::info!("Loaded LaunchAgent: {}", plist.display());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ServiceEntry>, AgentError> {
        let output = self.run(&["list".to_string()]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AgentError::ListFailed(if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            }));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_list_output(&stdout))
    }
}

/// The per-user launchd domain, `gui/<uid>`.
#[cfg(unix)]
fn gui_domain() -> Option<String> {
    Some(format!("gui/{}", nix::unistd::getuid()))
}

#[cfg(not(unix))]
fn gui_domain() -> Option<String> {
    None
}
