//! Reads the kernel's per-process status pseudo-file.
//!
//! `/proc/<pid>/status` is tiny and text-only, so it is read in one go and
//! filtered down to the memory and thread lines. The lines are kept verbatim,
//! original spacing included, because the report records exactly what the
//! kernel said.

use std::fs;

use crate::error::FootprintError;

/// Reads `/proc/<pid>/status` and keeps only the `Vm*`, `Rss*` and `Threads`
/// lines.
///
/// A status file that cannot be opened means the process exited between
/// discovery and readout; that is the [`FootprintError::StatusRead`] error.
pub fn read_status(pid: i32) -> Result<String, FootprintError> {
    let text = fs::read_to_string(format!("/proc/{pid}/status"))
        .map_err(|source| FootprintError::StatusRead { pid, source })?;
    Ok(filter_status(&text))
}

/// Keeps the interesting status lines, newline terminated, in file order.
fn filter_status(text: &str) -> String {
    let mut filtered = String::new();
    for line in text.lines() {
        if line.starts_with("Vm") || line.starts_with("Rss") || line.starts_with("Threads") {
            filtered.push_str(line);
            filtered.push('\n');
        }
    }
    filtered
}
