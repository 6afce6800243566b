//! Job definitions placed by the installer.
//!
//! A job definition is an opaque launchd property list identified only by
//! its file name. Its contents are never read or validated here.

use std::fmt;
use std::path::{Path, PathBuf};

/// Which of the two power strip jobs a definition drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    On,
    Off,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::On => write!(f, "on"),
            JobKind::Off => write!(f, "off"),
        }
    }
}

/// A job definition file and where it is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    kind: JobKind,
    file_name: String,
    source_path: PathBuf,
    destination_path: PathBuf,
}

impl JobDefinition {
    pub fn new(
        kind: JobKind,
        file_name: impl Into<String>,
        source_dir: &Path,
        agents_dir: &Path,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            kind,
            source_path: source_dir.join(&file_name),
            destination_path: agents_dir.join(&file_name),
            file_name,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// The launchd label, i.e. the file name without its `.plist` suffix.
    pub fn label(&self) -> &str {
        self.file_name
            .strip_suffix(".plist")
            .unwrap_or(&self.file_name)
    }
}
