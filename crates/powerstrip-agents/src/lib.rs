//! # powerstrip-agents
//!
//! Places the power strip "on" and "off" LaunchAgent definitions into the
//! user's LaunchAgents directory and registers them with launchd.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use powerstrip_agents::{Installer, InstallerConfig, Launchctl};
//!
//! let config = InstallerConfig::default();
//! let installer = Installer::new(config.clone(), Launchctl::from_config(&config))?;
//! let report = installer.run().await;
//! ```

pub mod config;
pub mod error;
pub mod installer;
pub mod job;
pub mod launchd;

// Re-exports
pub use config::{ConfigLoader, FailurePolicy, InstallerConfig, LoadMode};
pub use error::{AgentError, ConfigError};
pub use installer::{InstallReport, Installer, Step, StepRecord};
pub use job::{JobDefinition, JobKind};
pub use launchd::{Launchctl, ServiceEntry, ServiceManager};
