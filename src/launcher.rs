//! Spawns the proxy and waits for it to finish initializing.
//!
//! The proxy signals readiness by printing a marker line once its dispatch
//! loop is up. Depending on how its logger is configured the marker can land
//! on stdout or stderr, so both streams are redirected into a single pipe and
//! the launcher watches that merged stream. The wait is bounded: a proxy that
//! stays silent past the timeout is killed and the round fails without
//! leaking a process.

use std::fs::File;
use std::io::Read;
use std::os::fd::AsFd;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use nix::poll::{poll, PollFd, PollFlags};
use nix::unistd::pipe;

use crate::error::FootprintError;

/// Substring the proxy prints on its merged output once initialization is
/// complete.
pub const READINESS_MARKER: &str = "starting main dispatch loop";

/// Fixed `--concurrency` argument for every proxy invocation, so the worker
/// thread count never varies between rounds.
const CONCURRENCY: &str = "2";

/// A live proxy child process.
///
/// The read end of the merged output pipe is held for the lifetime of the
/// handle: closing it would raise `SIGPIPE` in a proxy that keeps logging
/// after readiness. Dropping the handle kills and reaps the child, so a round
/// cannot leak its proxy even when measurement fails partway.
#[derive(Debug)]
pub struct ProxyProcess {
    child: Child,
    /// Merged stdout/stderr stream; held open, not read, after launch.
    _stream: File,
    killed: bool,
}

impl ProxyProcess {
    /// OS process id of the direct child.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kills the proxy and waits for the OS to reap it. Idempotent.
    pub fn shutdown(&mut self) {
        if self.killed {
            return;
        }
        if let Err(err) = self.child.kill() {
            log::warn!("failed to kill proxy pid {}: {}", self.child.id(), err);
        }
        let _ = self.child.wait();
        self.killed = true;
    }
}

impl Drop for ProxyProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Launches `<executable> -c <config> --concurrency 2` and waits for the
/// readiness marker on the merged stdout/stderr stream.
///
/// The marker may appear anywhere in the output within the timeout window;
/// as soon as a line contains it the function returns a live [`ProxyProcess`].
/// A proxy that never prints the marker, or that closes its output first, is
/// killed and reported as [`FootprintError::LaunchTimeout`].
pub fn launch(
    executable: &Path,
    config: &Path,
    timeout: Duration,
) -> Result<ProxyProcess, FootprintError> {
    let (read_end, write_end) = pipe()?;
    let stderr_end = write_end.try_clone()?;

    log::info!(
        "launching {} -c {} --concurrency {}",
        executable.display(),
        config.display(),
        CONCURRENCY
    );
    let mut child = Command::new(executable)
        .arg("-c")
        .arg(config)
        .arg("--concurrency")
        .arg(CONCURRENCY)
        .stdin(Stdio::null())
        .stdout(Stdio::from(write_end))
        .stderr(Stdio::from(stderr_end))
        .spawn()?;

    // The parent's copies of the write end moved into `child`'s stdio above,
    // so EOF on `stream` now means the proxy closed its output.
    let mut stream = File::from(read_end);
    match wait_for_readiness(&mut stream, timeout) {
        Ok(()) => Ok(ProxyProcess {
            child,
            _stream: stream,
            killed: false,
        }),
        Err(err) => {
            // A failed launch must not leave a child behind.
            let _ = child.kill();
            let _ = child.wait();
            Err(err)
        }
    }
}

/// Polls the merged output until the marker shows up or the deadline passes.
///
/// EOF before the marker is reported as a timeout as well: once the proxy has
/// closed its output the marker can no longer arrive, so there is no point in
/// waiting out the rest of the window.
fn wait_for_readiness(stream: &mut File, timeout: Duration) -> Result<(), FootprintError> {
    let timeout_secs = timeout.as_secs();
    let deadline = Instant::now() + timeout;
    let mut pending = String::new();
    let mut buf = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FootprintError::LaunchTimeout { timeout_secs });
        }

        let millis = remaining.as_millis().min(u128::from(u16::MAX)) as u16;
        let ready = {
            let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
            poll(&mut fds, millis)?
        };
        if ready == 0 {
            // Poll ran out; the next iteration reports the timeout.
            continue;
        }

        let count = stream.read(&mut buf)?;
        if count == 0 {
            return Err(FootprintError::LaunchTimeout { timeout_secs });
        }
        pending.push_str(&String::from_utf8_lossy(&buf[..count]));

        if let Some(line) = pending.lines().find(|line| line.contains(READINESS_MARKER)) {
            log::info!("{}", line.trim());
            return Ok(());
        }
    }
}
