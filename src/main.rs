//! powerstrip-install
//!
//! Copies the power strip on/off LaunchAgent definitions into
//! ~/Library/LaunchAgents, loads them with launchctl, and lists the
//! registered services.

mod cli;
mod cmd_install;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// Get the ~/.powerstrip directory path.
fn powerstrip_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".powerstrip"))
        .unwrap_or_else(|| PathBuf::from(".powerstrip"))
}

/// Rolling file writer under ~/.powerstrip/logs (daily rotation, 7 files kept).
fn file_writer() -> Result<NonBlocking, Box<dyn std::error::Error>> {
    let log_dir = powerstrip_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("powerstrip")
        .filename_suffix("log")
        .max_log_files(7)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop, so it must live until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    Ok(non_blocking)
}

/// Initialize tracing with console (stderr) and file output.
///
/// stdout carries only the service listing.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, file_error) = match file_writer() {
        Ok(writer) => (Some(fmt::layer().with_writer(writer).with_ansi(false)), None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    cmd_install::handle_install(cli).await
}
