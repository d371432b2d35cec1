//! Subprocess execution against the adb command-line tool
//!
//! Every device interaction in this crate goes through [`AdbRunner`]:
//! one spawned process per call, an optional bounded wait, and a
//! structured [`CommandOutput`] the caller interprets. No retries
//! happen at this layer.

use crate::error::{BridgeError, Result};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Captured output of a single adb invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// True when the process exited with status 0
    pub success: bool,
    /// Raw exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Decoded stdout with line endings normalised (empty for binary runs)
    pub stdout: String,
    /// Raw stdout bytes, populated only by [`AdbRunner::run_binary`]
    pub stdout_raw: Vec<u8>,
    /// Decoded stderr
    pub stderr: String,
    /// Wall-clock time the invocation took
    pub duration: Duration,
}

impl CommandOutput {
    /// Treat a non-zero exit as [`BridgeError::CommandFailed`].
    ///
    /// Non-zero exits are not errors at the runner layer because some
    /// adb subcommands use them as ordinary signaling; callers that do
    /// consider them fatal opt in here.
    pub fn require_success(self) -> Result<CommandOutput> {
        if self.success {
            Ok(self)
        } else {
            let detail = if self.stderr.trim().is_empty() {
                self.stdout.trim().to_string()
            } else {
                self.stderr.trim().to_string()
            };
            Err(BridgeError::CommandFailed(format!(
                "exit code {:?}: {}",
                self.exit_code, detail
            )))
        }
    }
}

/// adb over Windows-style transports emits CRLF; normalise so parsers
/// only ever see `\n`.
fn normalize_line_endings(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace("\r\n", "\n")
}

/// Executes adb commands against an optional target device
#[derive(Debug, Clone)]
pub struct AdbRunner {
    adb_path: String,
}

impl AdbRunner {
    /// Create a runner using `adb` from PATH
    pub fn new() -> Self {
        Self {
            adb_path: "adb".to_string(),
        }
    }

    /// Create a runner with a custom adb binary path
    pub fn with_path(adb_path: String) -> Self {
        Self { adb_path }
    }

    fn command(&self, serial: Option<&str>, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.adb_path);
        if let Some(serial) = serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);
        cmd
    }

    /// Run an adb command, decoding output as text.
    ///
    /// `timeout: None` means an unbounded wait and is only appropriate
    /// for quick queries; anything that can block on the device side
    /// must pass a bound.
    pub async fn run(
        &self,
        serial: Option<&str>,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let started = Instant::now();
        let mut cmd = self.command(serial, args);

        debug!(?serial, ?args, "running adb command");

        let output = match timeout {
            Some(bound) => tokio::time::timeout(bound, cmd.output())
                .await
                .map_err(|_| {
                    BridgeError::CommandTimeout(format!(
                        "adb {} timed out after {:?}",
                        args.join(" "),
                        bound
                    ))
                })??,
            None => cmd.output().await?,
        };

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: normalize_line_endings(&output.stdout),
            stdout_raw: Vec::new(),
            stderr: normalize_line_endings(&output.stderr),
            duration: started.elapsed(),
        })
    }

    /// Run an adb command keeping stdout as raw bytes.
    ///
    /// Used for capture-type commands (`exec-out screencap -p`) whose
    /// payload would be corrupted by text decoding.
    pub async fn run_binary(
        &self,
        serial: Option<&str>,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let started = Instant::now();
        let mut cmd = self.command(serial, args);

        debug!(?serial, ?args, "running adb command (binary)");

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| {
                BridgeError::CommandTimeout(format!(
                    "adb {} timed out after {:?}",
                    args.join(" "),
                    timeout
                ))
            })??;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::new(),
            stdout_raw: output.stdout,
            stderr: normalize_line_endings(&output.stderr),
            duration: started.elapsed(),
        })
    }

    /// Spawn an adb command without waiting for it to exit.
    ///
    /// The child is detached from the caller's flow of control; the
    /// recording manager uses this for `screenrecord`, which runs for
    /// its whole `--time-limit`.
    pub fn spawn_detached(&self, serial: Option<&str>, args: &[&str]) -> Result<()> {
        let mut cmd = self.command(serial, args);
        cmd.stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        let mut child = cmd.spawn()?;
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        Ok(())
    }
}

impl Default for AdbRunner {
    fn default() -> Self {
        Self::new()
    }
}
