//! Footprint benchmark entry point.
//!
//! Measures the memory and thread footprint of a proxy across its embedded
//! Wasm runtime builds. The run is fully described by the built-in benchmark
//! matrix: nine runtime builds, each launched with one, two and three
//! instances. Phase one records one report block per round; phase two
//! re-reads the report and appends the delta summary.
//!
//! The plain zero-argument invocation runs the whole matrix; the flags only
//! override the report path and the settle delays.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use wasmvm_footprint::harness::{run_batch, RoundSpec, SettleTimes};
use wasmvm_footprint::report::parse_report;
use wasmvm_footprint::summary::summarize;

/// Command-line arguments. Every flag is an optional override.
#[derive(Parser, Debug)]
#[clap(
    name = "footprint",
    about = "Benchmarks the memory/thread footprint of a proxy across embedded Wasm runtimes."
)]
struct FootprintArgs {
    /// Report file to append to. Defaults to `report_<timestamp>.md`.
    #[clap(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Seconds to wait for the proxy's readiness marker.
    #[clap(long, value_name = "SECS", default_value_t = 5)]
    launch_timeout: u64,

    /// Settle seconds before the PID scan and after each kill.
    #[clap(long, value_name = "SECS", default_value_t = 1)]
    settle: u64,
}

/// The benchmark matrix: (label, proxy executable, configuration stem). Each
/// runtime build is measured with every instance count; the count selects
/// the `<stem>_<count>.yaml` proxy configuration.
const RUNTIME_BUILDS: [(&str, &str, &str); 9] = [
    ("v8", "exe_2_v8/envoy-static", "envoy_v8"),
    ("wasmtime", "exe_4_wasmtime/envoy-static", "envoy_wasmtime"),
    ("wamr-5-18-22", "exe_1_wamr_05_18_22/envoy-static", "envoy_wamr"),
    ("wamr-1-1-0", "exe_1_wamr_1_1_0/envoy-static", "envoy_wamr"),
    (
        "wamr-1-1-0-dis",
        "exe_1_wamr_1_1_0_dis_b_c/envoy-static",
        "envoy_wamr",
    ),
    ("wamr-fbac", "exe_1_wamr_fbac/envoy-static", "envoy_wamr"),
    (
        "wamr-fbac-dis",
        "exe_1_wamr_fbac_dis_b_c/envoy-static",
        "envoy_wamr",
    ),
    ("wamr-clone", "exe_1_wamr_clone/envoy-static", "envoy_wamr"),
    (
        "wamr-clone-dis",
        "exe_1_wamr_clone_dis_b_c/envoy-static",
        "envoy_wamr",
    ),
];

/// Instance counts measured for every runtime build.
const INSTANCE_COUNTS: std::ops::RangeInclusive<u32> = 1..=3;

fn benchmark_matrix() -> Vec<RoundSpec> {
    RUNTIME_BUILDS
        .iter()
        .flat_map(|&(vm, executable, config_stem)| {
            INSTANCE_COUNTS.map(move |instances| RoundSpec {
                vm: vm.to_string(),
                instances,
                executable: PathBuf::from(executable),
                config: PathBuf::from(format!("{config_stem}_{instances}.yaml")),
            })
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = FootprintArgs::parse();
    let report_path = args.output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");
        PathBuf::from(format!("report_{stamp}.md"))
    });
    let settle = SettleTimes {
        launch_timeout: Duration::from_secs(args.launch_timeout),
        pid_discovery: Duration::from_secs(args.settle),
        reap: Duration::from_secs(args.settle),
    };

    let specs = benchmark_matrix();

    log::info!("Start recording...");
    run_batch(&specs, &report_path, &settle);

    log::info!("Start reporting...");
    let rounds = parse_report(&report_path)
        .with_context(|| format!("failed to parse report {}", report_path.display()))?;
    let labels: Vec<String> = RUNTIME_BUILDS
        .iter()
        .map(|&(vm, _, _)| vm.to_string())
        .collect();
    let summary = summarize(&rounds, &labels)?;
    println!("{summary}");

    let mut report = OpenOptions::new()
        .append(true)
        .open(&report_path)
        .with_context(|| format!("failed to reopen report {}", report_path.display()))?;
    writeln!(report)?;
    report.write_all(summary.as_bytes())?;

    log::info!("Summary appended to {}.", report_path.display());
    Ok(())
}
