//! The install sequence.
//!
//! `copy(on) -> copy(off) -> load(on) -> load(off) -> list`. Each step waits
//! for the previous one. Under [`FailurePolicy::BestEffort`] a failing step is
//! recorded and the sequence continues; under [`FailurePolicy::FailFast`] it
//! stops at the first failure.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::{FailurePolicy, InstallerConfig};
use crate::error::AgentError;
use crate::job::{JobDefinition, JobKind};
use crate::launchd::{ServiceEntry, ServiceManager, filter_by_label};

/// One step of the install sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Copy(JobKind),
    Load(JobKind),
    List,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Copy(kind) => write!(f, "copy({})", kind),
            Step::Load(kind) => write!(f, "load({})", kind),
            Step::List => write!(f, "list"),
        }
    }
}

/// A step and how it ended.
#[derive(Debug)]
pub struct StepRecord {
    pub step: Step,
    pub result: Result<(), AgentError>,
}

/// Outcome of an install run.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Steps in execution order.
    pub steps: Vec<StepRecord>,
    /// Services matching the label filter, if the list step succeeded.
    pub listing: Option<Vec<ServiceEntry>>,
    /// Labels of the jobs absent from the listing.
    pub unregistered: Vec<String>,
    /// Whether fail-fast stopped the sequence early.
    pub aborted: bool,
}

impl InstallReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|record| record.result.is_err())
    }

    /// Every step ran and none failed.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.failures().next().is_none()
    }

    /// The listing ran and matched at least one service.
    pub fn listing_matched(&self) -> bool {
        self.listing.as_ref().is_some_and(|entries| !entries.is_empty())
    }
}

impl fmt::Display for InstallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(f, "Steps: {}/{} ok", self.steps.len() - failed, self.steps.len())?;
        if let Some(listing) = &self.listing {
            write!(f, ", Matched: {}", listing.len())?;
        }
        if self.aborted {
            write!(f, ", aborted")?;
        }
        Ok(())
    }
}

/// Places the on/off job definitions and registers them.
pub struct Installer<M> {
    config: InstallerConfig,
    agents_dir: PathBuf,
    jobs: [JobDefinition; 2],
    manager: M,
}

impl<M: ServiceManager> Installer<M> {
    /// Create an installer, validating `config` and resolving the
    /// destination directory.
    pub fn new(config: InstallerConfig, manager: M) -> Result<Self, AgentError> {
        config.validate()?;
        let agents_dir = config.resolve_agents_dir()?;
        let jobs = [
            JobDefinition::new(JobKind::On, &config.on_job, &config.source_dir, &agents_dir),
            JobDefinition::new(JobKind::Off, &config.off_job, &config.source_dir, &agents_dir),
        ];

        Ok(Self {
            config,
            agents_dir,
            jobs,
            manager,
        })
    }

    pub fn jobs(&self) -> &[JobDefinition] {
        &self.jobs
    }

    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Run the full sequence.
    pub async fn run(&self) -> InstallReport {
        let mut report = InstallReport::default();
        info!(
            "Installing {} job definitions into {}",
            self.jobs.len(),
            self.agents_dir.display()
        );

        for job in &self.jobs {
            let result = self.copy(job).await;
            if !self.record(&mut report, Step::Copy(job.kind()), result) {
                return report;
            }
        }

        for job in &self.jobs {
            let result = self.manager.load(job.destination_path()).await;
            if !self.record(&mut report, Step::Load(job.kind()), result) {
                return report;
            }
        }

        let result = self.manager.list().await.map(|entries| {
            let matched = filter_by_label(entries, &self.config.label_filter);
            info!(
                "{} service(s) matching '{}'",
                matched.len(),
                self.config.label_filter
            );
            report.listing = Some(matched);
        });
        self.record(&mut report, Step::List, result);

        if let Some(listing) = &report.listing {
            for job in &self.jobs {
                if !listing.iter().any(|entry| entry.label == job.label()) {
                    warn!("{} job '{}' is not registered", job.kind(), job.label());
                    report.unregistered.push(job.label().to_string());
                }
            }
        }

        report
    }

    /// Copy one job definition into the agents directory, replacing any
    /// previous copy.
    ///
    /// The bytes land in a sibling temp file that is renamed over the
    /// destination, so a read-only earlier copy does not block the rerun.
    async fn copy(&self, job: &JobDefinition) -> Result<(), AgentError> {
        let source = job.source_path();
        let destination = job.destination_path();
        let copy_error = |e: std::io::Error| AgentError::Copy {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        };

        match tokio::fs::try_exists(source).await {
            Ok(true) => {}
            Ok(false) => return Err(AgentError::SourceMissing(source.to_path_buf())),
            Err(e) => return Err(copy_error(e)),
        }

        tokio::fs::create_dir_all(&self.agents_dir)
            .await
            .map_err(|e| AgentError::DestinationUnwritable {
                path: self.agents_dir.clone(),
                source: e,
            })?;

        let staging = self.agents_dir.join(format!(".{}.tmp", job.file_name()));
        let unwritable = |e: std::io::Error| match e.kind() {
            ErrorKind::PermissionDenied => AgentError::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: e,
            },
            _ => copy_error(e),
        };

        match tokio::fs::remove_file(&staging).await {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(unwritable(e)),
            _ => {}
        }
        let bytes = tokio::fs::copy(source, &staging).await.map_err(unwritable)?;
        if let Err(e) = tokio::fs::rename(&staging, destination).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(unwritable(e));
        }

        info!(
            "Copied {} ({} bytes) to {}",
            job.file_name(),
            bytes,
            destination.display()
        );
        Ok(())
    }

    /// Record a step outcome. Returns whether the sequence should continue.
    fn record(
        &self,
        report: &mut InstallReport,
        step: Step,
        result: Result<(), AgentError>,
    ) -> bool {
        let failed = match &result {
            Ok(()) => false,
            Err(e) => {
                error!("Step {} failed: {}", step, e);
                true
            }
        };
        report.steps.push(StepRecord { step, result });

        if failed && self.config.failure_policy == FailurePolicy::FailFast {
            error!("Aborting after {} (fail-fast)", step);
            report.aborted = true;
            return false;
        }
        true
    }
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
