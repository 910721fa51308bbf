//! Round-trip properties of the report pipeline.
//!
//! # Test Methodology
//!
//! The report file is the only channel between the recording phase and the
//! reporting phase, so these tests exercise the loop as a whole: blocks
//! written by the writer must parse back into equivalent rounds, and parsed
//! rounds must aggregate into the expected summary rows. Status text is
//! synthesized in the kernel's `Key:\tvalue unit` shape rather than read
//! from a live process, which keeps every expected number exact.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wasmvm_footprint::report::{append_block, parse_report};
use wasmvm_footprint::summary::summarize;
use wasmvm_footprint::{FootprintError, Metric};

fn report_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.md");
    (dir, path)
}

/// Status text for one synthetic round, with the given VmRSS value.
fn status_text(vm_rss_kb: u64) -> String {
    format!(
        "VmPeak:\t  201000 kB\n\
         VmSize:\t  200000 kB\n\
         VmRSS:\t  {vm_rss_kb} kB\n\
         RssAnon:\t   50000 kB\n\
         RssFile:\t    9000 kB\n\
         RssShmem:\t    1000 kB\n\
         Threads:\t12\n"
    )
}

#[test]
fn written_block_parses_back_to_the_same_metrics() {
    let (_dir, path) = report_file();

    append_block(&path, "v8_1_vm", "VmSize:\t  200000 kB\nThreads:\t12\n").unwrap();

    let rounds = parse_report(&path).unwrap();
    assert_eq!(rounds.len(), 1);
    let round = &rounds[0];
    assert_eq!(round.vm, "v8");
    assert_eq!(round.instances, 1);
    // Exactly the metrics present in the source text, nothing else.
    assert_eq!(round.metrics.len(), 2);
    assert_eq!(round.metrics[&Metric::VmSize], 200_000);
    assert_eq!(round.metrics[&Metric::Threads], 12);
}

#[test]
fn n_blocks_parse_to_n_rounds_in_original_order() {
    let (_dir, path) = report_file();

    for instances in 1..=3u64 {
        let key = format!("v8_{instances}_vm");
        append_block(&path, &key, &status_text(60_000 + instances * 1000)).unwrap();
    }
    append_block(&path, "wasmtime_1_vm", &status_text(80_000)).unwrap();

    let rounds = parse_report(&path).unwrap();
    let keys: Vec<String> = rounds.iter().map(|round| round.key()).collect();
    assert_eq!(keys, ["v8_1_vm", "v8_2_vm", "v8_3_vm", "wasmtime_1_vm"]);
}

#[test]
fn parsed_rounds_summarize_into_the_expected_row() {
    let (_dir, path) = report_file();

    for (instances, vm_rss) in [(1u32, 100u64), (2, 140), (3, 175)] {
        append_block(&path, &format!("x_{instances}_vm"), &status_text(vm_rss)).unwrap();
    }

    let rounds = parse_report(&path).unwrap();
    let table = summarize(&rounds, &["x".to_string()]).unwrap();
    assert!(table.contains("|x|VmRSS|100|140|175|40|35|37.5|\n"));
    // Constant series aggregate to a zero mean delta.
    assert!(table.contains("|x|Threads|12|12|12|0|0|0|\n"));
}

#[test]
fn summary_needs_at_least_two_rounds_per_label() {
    let (_dir, path) = report_file();

    append_block(&path, "x_1_vm", &status_text(100)).unwrap();

    let rounds = parse_report(&path).unwrap();
    let err = summarize(&rounds, &["x".to_string()]).unwrap_err();
    assert!(matches!(
        err,
        FootprintError::NotEnoughRounds { rounds: 1, .. }
    ));
}

#[test]
fn reparsing_after_the_summary_is_appended_sees_the_same_rounds() {
    let (_dir, path) = report_file();

    for (instances, vm_rss) in [(1u32, 100u64), (2, 140)] {
        append_block(&path, &format!("x_{instances}_vm"), &status_text(vm_rss)).unwrap();
    }

    let rounds = parse_report(&path).unwrap();
    let table = summarize(&rounds, &["x".to_string()]).unwrap();

    let mut text = fs::read_to_string(&path).unwrap();
    text.push('\n');
    text.push_str(&table);
    fs::write(&path, text).unwrap();

    assert_eq!(parse_report(&path).unwrap(), rounds);
}

#[test]
fn hand_corrupted_header_aborts_parsing() {
    let (_dir, path) = report_file();

    append_block(&path, "x_1_vm", &status_text(100)).unwrap();
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("## corrupted-header-without-count\n```\nThreads:\t1\n```\n---\n");
    fs::write(&path, text).unwrap();

    let err = parse_report(&path).unwrap_err();
    assert!(matches!(err, FootprintError::MalformedReport { .. }));
}
