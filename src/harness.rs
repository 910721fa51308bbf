//! Drives measurement rounds: one proxy launched, measured and terminated at
//! a time.
//!
//! Round state machine: launch, settle, locate, read status, record, then
//! kill and settle again. Every failure path still kills the proxy and still
//! pauses before returning, so consecutive rounds never see each other's
//! leftovers. A failed round is logged and swallowed; the batch always runs
//! to completion and the report simply misses the failed blocks.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::FootprintError;
use crate::launcher;
use crate::locator;
use crate::report;
use crate::status;

/// One entry of the benchmark matrix: which runtime build to launch, and with
/// how many instances.
#[derive(Debug, Clone)]
pub struct RoundSpec {
    /// Configuration label: the runtime build under test.
    pub vm: String,
    /// Instance count encoded in the round key.
    pub instances: u32,
    /// Proxy executable; may be a symlink, resolved before launch.
    pub executable: PathBuf,
    /// Proxy configuration file for this instance count.
    pub config: PathBuf,
}

impl RoundSpec {
    /// Report-block key, `<vm>_<instances>_vm`.
    pub fn key(&self) -> String {
        format!("{}_{}_vm", self.vm, self.instances)
    }
}

/// The fixed delays the benchmark uses in place of explicit synchronization
/// with the proxy.
///
/// They are named and adjustable so the methodology can be tuned, or the
/// sleeps replaced by a real readiness signal later, without touching the
/// round logic.
#[derive(Debug, Clone)]
pub struct SettleTimes {
    /// Bound on the wait for the readiness marker.
    pub launch_timeout: Duration,
    /// Pause between readiness and the PID scan, giving the proxy time to
    /// finish allocating its runtime instances.
    pub pid_discovery: Duration,
    /// Pause after killing the proxy, letting the OS reclaim the process
    /// before the next round launches.
    pub reap: Duration,
}

impl Default for SettleTimes {
    fn default() -> Self {
        Self {
            launch_timeout: Duration::from_secs(5),
            pid_discovery: Duration::from_secs(1),
            reap: Duration::from_secs(1),
        }
    }
}

/// Runs every configured round in sequence.
///
/// Round failures are logged and do not stop the batch. The summary phase
/// later decides whether enough rounds survived per configuration.
pub fn run_batch(specs: &[RoundSpec], report_path: &Path, settle: &SettleTimes) {
    for spec in specs {
        log::info!("measuring {}", spec.key());
        if let Err(err) = run_round(spec, report_path, settle) {
            log::error!("round {} failed: {err}", spec.key());
        }
    }
}

/// Runs one round and always pauses afterwards, success or not, so the OS
/// has reclaimed the proxy before the caller moves on.
pub fn run_round(
    spec: &RoundSpec,
    report_path: &Path,
    settle: &SettleTimes,
) -> Result<(), FootprintError> {
    let outcome = launch_and_measure(spec, report_path, settle);
    thread::sleep(settle.reap);
    outcome
}

fn launch_and_measure(
    spec: &RoundSpec,
    report_path: &Path,
    settle: &SettleTimes,
) -> Result<(), FootprintError> {
    // The matrix may point at a symlink; the locator must match the command
    // path the kernel records, which is the resolved one.
    let executable = fs::canonicalize(&spec.executable)?;

    let mut proxy = launcher::launch(&executable, &spec.config, settle.launch_timeout)?;
    let outcome = measure(spec, &executable, report_path, settle);
    proxy.shutdown();
    outcome
}

/// The measurement half of a round: settle, locate, read, record.
fn measure(
    spec: &RoundSpec,
    executable: &Path,
    report_path: &Path,
    settle: &SettleTimes,
) -> Result<(), FootprintError> {
    thread::sleep(settle.pid_discovery);

    let prefix = executable.to_string_lossy();
    let pid = locator::find_pid(&prefix).ok_or_else(|| FootprintError::ProcessNotFound {
        prefix: prefix.to_string(),
    })?;
    log::info!("proxy pid is {pid}");

    let status_block = status::read_status(pid)?;
    report::append_block(report_path, &spec.key(), &status_block)
}
