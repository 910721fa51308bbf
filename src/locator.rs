//! Finds the PID of a freshly launched proxy in the OS process table.
//!
//! Readiness detection and PID discovery are deliberately decoupled: the
//! launcher watches the output stream, while the locator scans the process
//! table once, after a settle delay. The scan matches on the command path and
//! the first hit wins; a stale proxy left over from an earlier run would
//! shadow the fresh one. First-match is an accepted limitation of the
//! methodology.

/// Returns the PID of the first process whose command path starts with
/// `path_prefix`, or `None` when nothing matches.
///
/// This never fails: processes that vanish mid-scan or whose command line is
/// unreadable are skipped, and an unreadable process table degrades to `None`
/// with a warning.
pub fn find_pid(path_prefix: &str) -> Option<i32> {
    let processes = match procfs::process::all_processes() {
        Ok(processes) => processes,
        Err(err) => {
            log::warn!("cannot enumerate processes: {err}");
            return None;
        }
    };

    for entry in processes {
        let process = match entry {
            Ok(process) => process,
            Err(_) => continue, // raced with a process exiting
        };
        let cmdline = match process.cmdline() {
            Ok(cmdline) => cmdline,
            Err(_) => continue, // gone already, or not readable by us
        };
        if command_matches(&cmdline, path_prefix) {
            return Some(process.pid);
        }
    }

    None
}

/// Prefix match on argv\[0\]. Kernel threads expose an empty command line and
/// never match.
fn command_matches(cmdline: &[String], path_prefix: &str) -> bool {
    cmdline
        .first()
        .is_some_and(|argv0| argv0.starts_with(path_prefix))
}
