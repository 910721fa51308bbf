//! Report data model: measurement rounds and the metrics they carry.
//!
//! The report file is the sole source of truth. Rounds are appended during
//! the recording phase ([`append_block`]) and reconstructed from the same
//! file during the reporting phase ([`parse_report`]); nothing survives in
//! memory between the two phases.

use std::collections::BTreeMap;
use std::fmt;

mod parser;
mod writer;

pub use parser::parse_report;
pub use writer::append_block;

/// The process metrics extracted from `/proc/<pid>/status`.
///
/// Memory metrics are reported by the kernel in kilobytes; `Threads` is a
/// bare count. Declaration order is the row order of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    VmSize,
    VmRss,
    RssAnon,
    RssFile,
    RssShmem,
    Threads,
}

impl Metric {
    /// Every metric, in summary-row order.
    pub const ALL: [Metric; 6] = [
        Metric::VmSize,
        Metric::VmRss,
        Metric::RssAnon,
        Metric::RssFile,
        Metric::RssShmem,
        Metric::Threads,
    ];

    /// The key as it appears at the start of a status line.
    pub fn key(self) -> &'static str {
        match self {
            Metric::VmSize => "VmSize",
            Metric::VmRss => "VmRSS",
            Metric::RssAnon => "RssAnon",
            Metric::RssFile => "RssFile",
            Metric::RssShmem => "RssShmem",
            Metric::Threads => "Threads",
        }
    }

    /// Unit suffix the kernel prints after the value, if any.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Metric::Threads => None,
            _ => Some("kB"),
        }
    }

    /// The metric whose key opens `line`, if any. No key is a prefix of
    /// another, so the first hit is the only hit.
    fn for_line(line: &str) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|metric| line.starts_with(metric.key()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One launch-measure-terminate cycle, reconstructed from a report block.
///
/// A round is immutable once parsed. Metrics that were absent from the source
/// block are absent from the map, never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// Configuration label: the embedded Wasm runtime build under test.
    pub vm: String,
    /// Number of runtime instances requested in this round.
    pub instances: u32,
    /// Parsed values: kilobytes for memory metrics, a count for threads.
    pub metrics: BTreeMap<Metric, u64>,
}

impl Round {
    /// Report-block key for this round, `<vm>_<instances>_vm`.
    pub fn key(&self) -> String {
        format!("{}_{}_vm", self.vm, self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_keys_match_kernel_spelling() {
        assert_eq!(Metric::VmRss.key(), "VmRSS");
        assert_eq!(Metric::VmRss.to_string(), "VmRSS");
        assert_eq!(Metric::Threads.key(), "Threads");
    }

    #[test]
    fn only_threads_is_unitless() {
        for metric in Metric::ALL {
            match metric {
                Metric::Threads => assert_eq!(metric.unit(), None),
                _ => assert_eq!(metric.unit(), Some("kB")),
            }
        }
    }

    #[test]
    fn for_line_recognizes_exactly_the_tracked_keys() {
        assert_eq!(Metric::for_line("VmRSS:\t  100 kB"), Some(Metric::VmRss));
        assert_eq!(Metric::for_line("Threads:\t12"), Some(Metric::Threads));
        // VmPeak is captured by the status filter but is not a report metric.
        assert_eq!(Metric::for_line("VmPeak:\t  200 kB"), None);
        assert_eq!(Metric::for_line("Name:\tenvoy"), None);
    }

    #[test]
    fn round_key_encodes_label_and_instances() {
        let round = Round {
            vm: "wasmtime".to_string(),
            instances: 3,
            metrics: BTreeMap::new(),
        };
        assert_eq!(round.key(), "wasmtime_3_vm");
    }
}
