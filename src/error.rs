//! This module defines the error types for the benchmark.
//!
//! Each variant corresponds to one failure point of a measurement round or of
//! the analysis phase. Round-level failures (`LaunchTimeout`,
//! `ProcessNotFound`, `StatusRead`) are caught by the harness, logged, and
//! swallowed so the batch keeps going; analysis-phase failures
//! (`MalformedReport`, `NotEnoughRounds`) propagate out of `main`, since a
//! report the tool itself produced should never be malformed and a summary
//! over a single round has no deltas to average.

use std::io;

use thiserror::Error;

/// Represents all possible errors that can occur while recording or
/// analyzing a benchmark run.
#[derive(Error, Debug)]
pub enum FootprintError {
    /// Wraps a standard I/O error (report file access, process spawning).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Wraps an errno from the pipe/poll plumbing underneath the launcher.
    #[error("system call failed: {0}")]
    Sys(#[from] nix::Error),

    /// The proxy never printed its readiness marker within the bound.
    #[error("proxy did not become ready within {timeout_secs} s")]
    LaunchTimeout { timeout_secs: u64 },

    /// No running process matched the expected command path prefix.
    #[error("no running process has a command path starting with '{prefix}'")]
    ProcessNotFound { prefix: String },

    /// `/proc/<pid>/status` could not be read; the process is usually gone.
    #[error("cannot read /proc/{pid}/status: {source}")]
    StatusRead {
        pid: i32,
        #[source]
        source: io::Error,
    },

    /// A report line did not match the structure the writer produces.
    #[error("malformed report line: '{line}'")]
    MalformedReport { line: String },

    /// Deltas are differences between consecutive rounds, so a configuration
    /// with fewer than two rounds has nothing to average.
    #[error("configuration '{label}' has {rounds} round(s), need at least 2 to compute deltas")]
    NotEnoughRounds { label: String, rounds: usize },
}

// Unit tests to ensure error messages are formatted correctly.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_timeout_message() {
        let error = FootprintError::LaunchTimeout { timeout_secs: 5 };
        assert_eq!(error.to_string(), "proxy did not become ready within 5 s");
    }

    #[test]
    fn test_process_not_found_message() {
        let error = FootprintError::ProcessNotFound {
            prefix: "/opt/proxy/envoy-static".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no running process has a command path starting with '/opt/proxy/envoy-static'"
        );
    }

    #[test]
    fn test_malformed_report_message() {
        let error = FootprintError::MalformedReport {
            line: "## broken header".to_string(),
        };
        assert_eq!(error.to_string(), "malformed report line: '## broken header'");
    }

    #[test]
    fn test_not_enough_rounds_message() {
        let error = FootprintError::NotEnoughRounds {
            label: "v8".to_string(),
            rounds: 1,
        };
        assert_eq!(
            error.to_string(),
            "configuration 'v8' has 1 round(s), need at least 2 to compute deltas"
        );
    }
}
