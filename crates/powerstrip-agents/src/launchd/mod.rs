//! macOS launchd client.
//!
//! Wraps the `launchctl` binary: loading job definitions by path and
//! listing the services registered in the user's session.

mod launchctl;
mod listing;

pub use launchctl::{Launchctl, ServiceManager};
pub use listing::{ServiceEntry, filter_by_label, parse_list_output};

#[cfg(test)]
#[path = "launchd_tests.rs"]
mod tests;
