use super::*;
use crate::config::{InstallerConfig, LoadMode};
use std::path::Path;

const LIST_OUTPUT: &str = "PID\tStatus\tLabel
-\t0\tcom.powerstrip.on
412\t0\tcom.apple.Finder
-\t-9\tcom.powerstrip.off
-\t78\tcom.example.Powerstrip.helper
";

#[test]
fn test_parse_list_output_skips_header() {
    let entries = parse_list_output(LIST_OUTPUT);
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.label != "Label"));
}

#[test]
fn test_parse_list_output_columns() {
    let entries = parse_list_output(LIST_OUTPUT);
    assert_eq!(
        entries[0],
        ServiceEntry {
            pid: None,
            last_exit_status: Some(0),
            label: "com.powerstrip.on".to_string(),
        }
    );
    assert_eq!(entries[1].pid, Some(412));
    assert_eq!(entries[2].last_exit_status, Some(-9));
}

#[test]
fn test_parse_list_output_skips_malformed_rows() {
    let output = "PID\tStatus\tLabel\n\ngarbage\nabc\t0\tcom.bad.pid\n-\t-\tcom.ok\n";
    let entries = parse_list_output(output);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, "com.ok");
    assert_eq!(entries[0].last_exit_status, None);
}

#[test]
fn test_filter_by_label_is_case_sensitive() {
    let matches = filter_by_label(parse_list_output(LIST_OUTPUT), "com.powerstrip");
    let labels: Vec<_> = matches.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["com.powerstrip.on", "com.powerstrip.off"]);
}

#[test]
fn test_filter_by_label_no_match() {
    assert!(filter_by_label(parse_list_output(LIST_OUTPUT), "org.nothing").is_empty());
}

#[test]
fn test_service_entry_display() {
    let entry = ServiceEntry {
        pid: Some(7),
        last_exit_status: None,
        label: "com.powerstrip.on".to_string(),
    };
    assert_eq!(entry.to_string(), "7\t-\tcom.powerstrip.on");
}

#[test]
fn test_legacy_load_args() {
    let launchctl = Launchctl::default();
    let args = launchctl.load_args(Path::new("/agents/com.powerstrip.on.plist"));
    assert_eq!(args, vec!["load", "/agents/com.powerstrip.on.plist"]);
}

#[cfg(unix)]
#[test]
fn test_bootstrap_load_args() {
    let launchctl = Launchctl::default().with_mode(LoadMode::Bootstrap);
    let args = launchctl.load_args(Path::new("/agents/a.on.plist"));
    assert_eq!(args.len(), 3);
    assert_eq!(args[0], "bootstrap");
    assert!(args[1].starts_with("gui/"));
    assert_eq!(args[2], "/agents/a.on.plist");
}

#[test]
fn test_from_config() {
    let config = InstallerConfig::default()
        .launchctl("/opt/bin/launchctl")
        .load_mode(LoadMode::Bootstrap)
        .command_timeout_secs(3);
    let launchctl = Launchctl::from_config(&config);

    assert_eq!(launchctl.program(), Path::new("/opt/bin/launchctl"));
    assert_eq!(launchctl.mode(), LoadMode::Bootstrap);
    assert_eq!(launchctl.timeout(), std::time::Duration::from_secs(3));
}

#[test]
fn test_default_launchctl() {
    let launchctl = Launchctl::default();
    assert_eq!(launchctl.program(), Path::new("launchctl"));
    assert_eq!(launchctl.mode(), LoadMode::Legacy);
    assert_eq!(launchctl.timeout(), std::time::Duration::from_secs(30));
}

#[tokio::test]
async fn test_missing_binary_reports_spawn_error() {
    let launchctl = Launchctl::new("/nonexistent/bin/launchctl-test");
    let err = launchctl.list().await.unwrap_err();
    assert!(matches!(err, crate::error::AgentError::CommandSpawn { .. }));
}
