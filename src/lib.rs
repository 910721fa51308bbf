//! Memory/thread footprint benchmark for a proxy with embedded Wasm runtimes.
//!
//! This crate launches the same proxy binary once per (runtime build, instance
//! count) pair, scrapes the kernel's view of the running process, and turns
//! the accumulated measurements into a comparison table. Everything revolves
//! around one append-only report file: the recording phase appends one fenced
//! block per measurement round, the reporting phase re-parses that same file
//! and appends a delta summary. The file is the only state shared between the
//! two phases, so a crashed or partial run keeps every block recorded so far.
//!
//! ## Components
//!
//! - [`launcher`]: spawns the proxy and waits for its readiness marker on a
//!   merged stdout/stderr stream.
//! - [`locator`]: finds the proxy's PID by scanning the OS process table for
//!   a command path prefix.
//! - [`status`]: extracts the `Vm*`/`Rss*`/`Threads` lines from
//!   `/proc/<pid>/status`, verbatim.
//! - [`report`]: the round data model plus the block writer and parser for
//!   the report file.
//! - [`summary`]: successive deltas and the mean delta per metric, rendered
//!   as a pipe-delimited table.
//! - [`harness`]: the sequential round driver gluing the above together.
//!
//! Measurement is strictly sequential: one proxy at a time, launched,
//! measured, killed and settled before the next round starts. The only
//! concurrency is between this process and the proxy child it is observing.

pub mod error;
pub mod harness;
pub mod launcher;
pub mod locator;
pub mod report;
pub mod status;
pub mod summary;

// Re-export the types that appear in most signatures.
pub use error::FootprintError;
pub use report::{Metric, Round};
