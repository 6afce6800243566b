//! CLI definitions for powerstrip-install.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Installs the power strip on/off LaunchAgents and registers them with launchd.
///
/// Runs with no arguments: copies the two job definitions from the current
/// directory into ~/Library/LaunchAgents, loads both, then lists the matching
/// services.
#[derive(Parser)]
#[command(name = "powerstrip-install")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "POWERSTRIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the job definitions (default: current directory)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Destination directory (default: ~/Library/LaunchAgents)
    #[arg(long)]
    pub agents_dir: Option<PathBuf>,

    /// Stop at the first failing step instead of attempting all of them
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format for the service listing
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// `PID<TAB>Status<TAB>Label`, one service per line
    Text,
    /// JSON array of services
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["powerstrip-install"]).unwrap();
        assert!(cli.source_dir.is_none());
        assert!(!cli.fail_fast);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "powerstrip-install",
            "--config",
            "/etc/powerstrip.toml",
            "--source-dir",
            "/opt/jobs",
            "--agents-dir",
            "/tmp/agents",
            "--fail-fast",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/powerstrip.toml")));
        assert_eq!(cli.source_dir, Some(PathBuf::from("/opt/jobs")));
        assert_eq!(cli.agents_dir, Some(PathBuf::from("/tmp/agents")));
        assert!(cli.fail_fast);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["powerstrip-install", "extra"]).is_err());
    }
}
