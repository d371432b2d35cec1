//! Logcat retrieval passthroughs

use crate::config::TIMING_CONFIG;
use crate::error::Result;
use crate::AdbRunner;
use std::time::Duration;

fn shell_timeout() -> Duration {
    Duration::from_secs(TIMING_CONFIG.runner.shell_timeout)
}

/// Dump the most recent logcat lines without blocking.
///
/// `tag`/`level` narrow with a logcat filterspec; `package` is a plain
/// substring filter applied client-side since logcat has no notion of
/// package names.
pub async fn logcat_dump(
    runner: &AdbRunner,
    serial: &str,
    lines: u32,
    tag: Option<&str>,
    level: char,
    package: Option<&str>,
) -> Result<String> {
    let count = lines.to_string();
    let mut args: Vec<&str> = vec!["shell", "logcat", "-d", "-t", count.as_str()];

    let filterspec;
    if let Some(tag) = tag {
        filterspec = format!("{}:{}", tag, level);
        args.push("-s");
        args.push(&filterspec);
    }

    let output = runner
        .run(Some(serial), &args, Some(shell_timeout()))
        .await?
        .require_success()?;

    let text = match package {
        Some(package) => output
            .stdout
            .lines()
            .filter(|line| line.contains(package))
            .collect::<Vec<_>>()
            .join("\n"),
        None => output.stdout,
    };
    Ok(text)
}

/// Clear the logcat buffer
pub async fn clear_logcat(runner: &AdbRunner, serial: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["shell", "logcat", "-c"],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;
    Ok(())
}
