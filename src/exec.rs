//! Shell snippet execution with a bounded timeout.
//!
//! `run`-kind commands are executed at export time using the active shell as
//! interpreter. Execution is the only blocking operation in the pipeline, so
//! it is bounded: on timeout the child is forcibly terminated and the call
//! reports a failure.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a completed snippet execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the child exited with status zero.
    pub success: bool,
    /// Exit code, when the child exited normally.
    pub code: Option<i32>,
}

/// Low-level execution failures, before they are attributed to a command.
#[derive(Error, Debug)]
pub enum ExecError {
    /// No interpreter was provided.
    #[error("active shell is required")]
    NoShell,

    /// The child did not finish within the allotted time and was killed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Spawning or reaping the child failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Execute `snippet` with `shell -c`, capturing stdout and stderr.
///
/// A non-zero exit is *not* an error here; callers inspect
/// [`ExecResult::success`] and decide. Only launch failures and timeouts
/// surface as [`ExecError`].
///
/// # Errors
///
/// Fails when `shell` is blank, the process cannot be spawned, or the
/// timeout expires (the child is killed first).
pub fn run_snippet(shell: &str, snippet: &str, timeout: Duration) -> Result<ExecResult, ExecError> {
    if shell.trim().is_empty() {
        return Err(ExecError::NoShell);
    }

    let mut child = Command::new(shell)
        .arg("-c")
        .arg(snippet)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_timeout(&mut child, timeout)?;

    Ok(ExecResult {
        stdout: String::from_utf8_lossy(&join(stdout)).to_string(),
        stderr: String::from_utf8_lossy(&join(stderr)).to_string(),
        success: status.success(),
        code: status.code(),
    })
}

/// Read a pipe to the end on a background thread so the child never blocks
/// on a full pipe buffer while we poll for its exit.
fn drain<R>(pipe: Option<R>) -> Option<std::thread::JoinHandle<Vec<u8>>>
where
    R: std::io::Read + Send + 'static,
{
    pipe.map(|mut r| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf).ok();
            buf
        })
    })
}

fn join(handle: Option<std::thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, ExecError> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().ok();
            return Err(ExecError::Timeout(timeout));
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}
