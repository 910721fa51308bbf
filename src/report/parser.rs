//! Reconstructs measurement rounds from the report file.
//!
//! The parser makes a single forward pass. A `## <vm>_<n>_vm` header opens a
//! round, recognized metric lines fill it, and a separator line emits it into
//! the result sequence. The accumulator is a local of the parsing loop;
//! nothing survives a call.
//!
//! The report is produced exclusively by the writer, so a header or metric
//! line that does not match its pattern is a hard
//! [`FootprintError::MalformedReport`] rather than something to skim past:
//! it means the file was corrupted and no downstream number can be trusted.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;

use super::{Metric, Round};
use crate::error::FootprintError;

/// Parses the report file into rounds, in file order.
pub fn parse_report(path: &Path) -> Result<Vec<Round>, FootprintError> {
    let text = fs::read_to_string(path)?;
    parse_rounds(&text)
}

/// Single forward pass over the report text. Split from the file read so the
/// grammar can be tested without touching the filesystem.
fn parse_rounds(text: &str) -> Result<Vec<Round>, FootprintError> {
    // Hard-coded patterns; compilation cannot fail.
    let header = Regex::new(r"^## (\S+)_(\d+)_vm").expect("header pattern must compile");
    let memory = Regex::new(r"^(?:VmSize|VmRSS|RssAnon|RssFile|RssShmem):\s+(?P<value>\d+)\s+kB")
        .expect("memory pattern must compile");
    let threads = Regex::new(r"^Threads:\s+(?P<value>\d+)").expect("threads pattern must compile");

    let mut rounds = Vec::new();
    let mut current: Option<Round> = None;

    for line in text.lines() {
        if line.starts_with("##") {
            let captures = header.captures(line).ok_or_else(|| malformed(line))?;
            let instances = captures[2].parse::<u32>().map_err(|_| malformed(line))?;
            current = Some(Round {
                vm: captures[1].to_string(),
                instances,
                metrics: BTreeMap::new(),
            });
        } else if line.starts_with("--") {
            if let Some(round) = current.take() {
                rounds.push(round);
            }
        } else if let Some(metric) = Metric::for_line(line) {
            let captures = match metric.unit() {
                Some(_) => memory.captures(line),
                None => threads.captures(line),
            }
            .ok_or_else(|| malformed(line))?;
            let value = captures["value"].parse::<u64>().map_err(|_| malformed(line))?;

            // The writer only emits metric lines inside a fenced block; a
            // stray one outside any block carries no round to attach to.
            if let Some(round) = current.as_mut() {
                round.metrics.insert(metric, value);
            }
        }
        // Fence lines, blanks, untracked status keys and the appended summary
        // section all fall through here.
    }

    Ok(rounds)
}

fn malformed(line: &str) -> FootprintError {
    FootprintError::MalformedReport {
        line: line.to_string(),
    }
}
