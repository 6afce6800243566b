//! The install command: configuration, the install sequence, and output.

use std::error::Error;
use std::io::Write;
use std::process::ExitCode;

use tracing::{error, info};

use powerstrip_agents::{
    ConfigError, ConfigLoader, FailurePolicy, InstallReport, Installer, InstallerConfig,
    Launchctl, ServiceEntry,
};

use crate::cli::{Cli, OutputFormat};

/// Exit status for configuration errors raised before any step runs.
const EXIT_CONFIG: u8 = 2;

/// Run the installer, printing the listing to stdout.
pub(crate) async fn handle_install(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let status = install(&cli, &mut std::io::stdout().lock()).await?;
    Ok(ExitCode::from(status))
}

/// Run the installer, writing the listing to `out`, and return the exit status.
async fn install<W: Write>(cli: &Cli, out: &mut W) -> Result<u8, Box<dyn Error>> {
    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(EXIT_CONFIG);
        }
    };

    let manager = Launchctl::from_config(&config);
    #[cfg(not(target_os = "macos"))]
    tracing::warn!(
        "launchd is only available on macOS, invoking {} anyway",
        manager.program().display()
    );

    let installer = match Installer::new(config, manager) {
        Ok(installer) => installer,
        Err(e) => {
            error!("{}", e);
            return Ok(EXIT_CONFIG);
        }
    };

    let report = installer.run().await;
    write_listing(out, report.listing.as_deref().unwrap_or_default(), cli.format)?;
    info!("{}", report);

    Ok(exit_status(&report))
}

/// Merge the optional config file with command-line overrides.
fn build_config(cli: &Cli) -> Result<InstallerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ConfigLoader::load(path)?
        }
        None => InstallerConfig::default(),
    };

    if let Some(dir) = &cli.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(dir) = &cli.agents_dir {
        config.agents_dir = Some(dir.clone());
    }
    if cli.fail_fast {
        config.failure_policy = FailurePolicy::FailFast;
    }

    config.validate()?;
    Ok(config)
}

/// Render the filtered listing.
fn write_listing<W: Write>(
    out: &mut W,
    listing: &[ServiceEntry],
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Text => {
            for entry in listing {
                writeln!(out, "{}", entry)?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(listing)?)?;
        }
    }
    Ok(())
}

/// Zero only when the listing ran and found a matching service, like a
/// pipeline ending in `grep`.
fn exit_status(report: &InstallReport) -> u8 {
    if report.listing_matched() { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::NamedTempFile;

    fn entries() -> Vec<ServiceEntry> {
        vec![
            ServiceEntry {
                pid: None,
                last_exit_status: Some(0),
                label: "com.powerstrip.on".to_string(),
            },
            ServiceEntry {
                pid: Some(88),
                last_exit_status: Some(-9),
                label: "com.powerstrip.off".to_string(),
            },
        ]
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["powerstrip-install"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_build_config_overrides() {
        let cli = parse(&["--source-dir", "/opt/jobs", "--agents-dir", "/tmp/agents", "--fail-fast"]);
        let cli = Cli { config: None, ..cli };
        let config = build_config(&cli).unwrap();
        assert_eq!(config.source_dir, std::path::PathBuf::from("/opt/jobs"));
        assert_eq!(config.agents_dir, Some(std::path::PathBuf::from("/tmp/agents")));
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_build_config_missing_file() {
        let cli = parse(&["--config", "/nonexistent/powerstrip.toml"]);
        assert!(matches!(build_config(&cli), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_exit_status_requires_match() {
        let mut report = InstallReport::default();
        assert_eq!(exit_status(&report), 1);

        report.listing = Some(Vec::new());
        assert_eq!(exit_status(&report), 1);

        report.listing = Some(vec![ServiceEntry {
            pid: None,
            last_exit_status: Some(0),
            label: "com.powerstrip.on".to_string(),
        }]);
        assert_eq!(exit_status(&report), 0);
    }

    #[test]
    fn test_write_listing_text() {
        let mut out = Vec::new();
        write_listing(&mut out, &entries(), OutputFormat::Text).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-\t0\tcom.powerstrip.on\n88\t-9\tcom.powerstrip.off\n"
        );
    }

    #[test]
    fn test_write_listing_json() {
        let mut out = Vec::new();
        write_listing(&mut out, &entries(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["label"], "com.powerstrip.on");
        assert!(value[0]["pid"].is_null());
        assert_eq!(value[1]["pid"], 88);
        assert_eq!(value[1]["last_exit_status"], -9);
    }

    #[test]
    fn test_write_listing_empty() {
        let mut text = Vec::new();
        write_listing(&mut text, &[], OutputFormat::Text).unwrap();
        assert!(text.is_empty());

        let mut json = Vec::new();
        write_listing(&mut json, &[], OutputFormat::Json).unwrap();
        assert_eq!(String::from_utf8(json).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_invalid_config_file_exits_with_config_status() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "command_timeout_secs = 0").unwrap();
        let cli = parse(&["--config", file.path().to_str().unwrap()]);

        let mut out = Vec::new();
        let status = install(&cli, &mut out).await.unwrap();

        assert_eq!(status, EXIT_CONFIG);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_file_exits_with_config_status() {
        let cli = parse(&["--config", "/nonexistent/powerstrip.toml"]);
        let mut out = Vec::new();
        assert_eq!(install(&cli, &mut out).await.unwrap(), EXIT_CONFIG);
    }
}
