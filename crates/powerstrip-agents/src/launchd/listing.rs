//! Parsing of `launchctl list` output.

use std::fmt;

use serde::Serialize;

/// One row of `launchctl list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    /// Process ID if the job is running.
    pub pid: Option<u32>,
    /// Exit status of the last run, if any.
    pub last_exit_status: Option<i32>,
    /// Service label.
    pub label: String,
}

impl fmt::Display for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "{}", pid)?,
            None => write!(f, "-")?,
        }
        match self.last_exit_status {
            Some(status) => write!(f, "\t{}", status)?,
            None => write!(f, "\t-")?,
        }
        write!(f, "\t{}", self.label)
    }
}

/// Parse the `PID Status Label` table printed by `launchctl list`.
///
/// The header and malformed rows are skipped.
pub fn parse_list_output(output: &str) -> Vec<ServiceEntry> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ServiceEntry> {
    let mut parts = line.split_whitespace();
    let pid = parts.next()?;
    let status = parts.next()?;
    let label = parts.collect::<Vec<_>>().join(" ");
    if label.is_empty() || pid == "PID" {
        return None;
    }

    let pid = match pid {
        "-" => None,
        s => Some(s.parse().ok()?),
    };
    let last_exit_status = match status {
        "-" => None,
        s => Some(s.parse().ok()?),
    };

    Some(ServiceEntry {
        pid,
        last_exit_status,
        label,
    })
}

/// Keep the entries whose label contains `needle` (case-sensitive).
pub fn filter_by_label(entries: Vec<ServiceEntry>, needle: &str) -> Vec<ServiceEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.label.contains(needle))
        .collect()
}
