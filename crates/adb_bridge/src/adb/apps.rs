//! App lifecycle passthroughs

use crate::config::TIMING_CONFIG;
use crate::error::Result;
use crate::AdbRunner;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref FOCUSED_COMPONENT: Regex =
        Regex::new(r"([A-Za-z0-9_.]+)/([A-Za-z0-9_.$]+)").unwrap();
}

fn shell_timeout() -> Duration {
    Duration::from_secs(TIMING_CONFIG.runner.shell_timeout)
}

/// Launch an app's default LAUNCHER activity via monkey
pub async fn launch(runner: &AdbRunner, serial: &str, package: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &[
                "shell",
                "monkey",
                "-p",
                package,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;
    tokio::time::sleep(Duration::from_secs_f64(TIMING_CONFIG.input.launch_delay)).await;
    Ok(())
}

/// Start a specific activity
pub async fn start_activity(
    runner: &AdbRunner,
    serial: &str,
    package: &str,
    activity: &str,
) -> Result<()> {
    let component = format!("{}/{}", package, activity);
    runner
        .run(
            Some(serial),
            &["shell", "am", "start", "-n", &component],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// Force stop an app
pub async fn force_stop(runner: &AdbRunner, serial: &str, package: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["shell", "am", "force-stop", package],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// Clear all data for an app, as if freshly installed
pub async fn clear_data(runner: &AdbRunner, serial: &str, package: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["shell", "pm", "clear", package],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// List installed packages, optionally filtered by substring
pub async fn list_packages(
    runner: &AdbRunner,
    serial: &str,
    filter: Option<&str>,
    include_system: bool,
) -> Result<Vec<String>> {
    let mut args = vec!["shell", "pm", "list", "packages"];
    if !include_system {
        args.push("-3");
    }

    let output = runner
        .run(Some(serial), &args, Some(shell_timeout()))
        .await?
        .require_success()?;

    let mut packages: Vec<String> = output
        .stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .filter(|p| {
            filter
                .map(|f| p.to_lowercase().contains(&f.to_lowercase()))
                .unwrap_or(true)
        })
        .map(str::to_string)
        .collect();
    packages.sort();
    Ok(packages)
}

/// Install an APK from a local path, replacing any existing install
pub async fn install(runner: &AdbRunner, serial: &str, apk_path: &str) -> Result<()> {
    runner
        .run(
            Some(serial),
            &["install", "-r", apk_path],
            Some(Duration::from_secs(TIMING_CONFIG.runner.pull_timeout)),
        )
        .await?
        .require_success()?;
    Ok(())
}

/// Uninstall an app
pub async fn uninstall(runner: &AdbRunner, serial: &str, package: &str) -> Result<()> {
    runner
        .run(Some(serial), &["uninstall", package], Some(shell_timeout()))
        .await?
        .require_success()?;
    Ok(())
}

/// The currently focused `package/activity` component, if one can be
/// read from the activity manager
pub async fn current_activity(runner: &AdbRunner, serial: &str) -> Result<Option<String>> {
    let output = runner
        .run(
            Some(serial),
            &["shell", "dumpsys", "activity", "activities"],
            Some(shell_timeout()),
        )
        .await?
        .require_success()?;

    Ok(parse_focused_component(&output.stdout))
}

fn parse_focused_component(dump: &str) -> Option<String> {
    dump.lines()
        .find(|line| line.contains("ResumedActivity") || line.contains("mFocusedActivity"))
        .and_then(|line| FOCUSED_COMPONENT.captures(line))
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
}
