//! Device file transfer and raw shell passthroughs

use crate::config::TIMING_CONFIG;
use crate::error::Result;
use crate::AdbRunner;
use std::time::Duration;

/// Push a local file to the device
pub async fn push(runner: &AdbRunner, serial: &str, local: &str, remote: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["push", local, remote],
            Some(Duration::from_secs(TIMING_CONFIG.runner.pull_timeout)),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// Pull a file from the device to a local path
pub async fn pull(runner: &AdbRunner, serial: &str, remote: &str, local: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["pull", remote, local],
            Some(Duration::from_secs(TIMING_CONFIG.runner.pull_timeout)),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// List a directory on the device
pub async fn ls(runner: &AdbRunner, serial: &str, remote_path: &str) -> Result<String> {
    let output = runner
        .run(
            Some(serial),
            &["shell", "ls", "-la", remote_path],
            Some(Duration::from_secs(TIMING_CONFIG.runner.shell_timeout)),
        )
        .await?
        .require_success()?;
    Ok(output.stdout)
}

/// Run an arbitrary shell command on the device and return its output
pub async fn shell(runner: &AdbRunner, serial: &str, command: &str) -> Result<String> {
    let output = runner
        .run(
            Some(serial),
            &["shell", command],
            Some(Duration::from_secs(TIMING_CONFIG.runner.shell_timeout)),
        )
        .await?;
    // Callers inspect the combined text; shell exit codes are theirs
    // to interpret
    if output.stderr.is_empty() {
        Ok(output.stdout)
    } else {
        Ok(format!("{}{}", output.stdout, output.stderr))
    }
}
