//! Screenshot capture for Android devices

use crate::config::TIMING_CONFIG;
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A captured screenshot, PNG-encoded
#[derive(Debug, Clone, Serialize)]
pub struct Screenshot {
    pub base64_data: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

/// `screencap -p` emits a few dozen bytes of error text when the
/// framework refuses the capture; anything this small is not a PNG
const MIN_PNG_BYTES: usize = 100;

async fn capture_png(runner: &AdbRunner, serial: &str) -> Result<Vec<u8>> {
    let timeout = Duration::from_secs(TIMING_CONFIG.runner.screenshot_timeout);

    // exec-out keeps the payload binary end to end; `shell` would
    // mangle it through a pty
    let output = runner
        .run_binary(Some(serial), &["exec-out", "screencap", "-p"], timeout)
        .await?;

    if output.stdout_raw.len() < MIN_PNG_BYTES {
        return Err(BridgeError::CaptureFailed(format!(
            "screencap returned {} bytes on {}: {}",
            output.stdout_raw.len(),
            serial,
            output.stderr.trim()
        )));
    }

    Ok(output.stdout_raw)
}

/// Capture a screenshot and return it base64-encoded with dimensions
pub async fn screenshot(runner: &AdbRunner, serial: &str) -> Result<Screenshot> {
    let png = capture_png(runner, serial).await?;

    let img = image::load_from_memory(&png)?;
    debug!(
        serial,
        width = img.width(),
        height = img.height(),
        "captured screenshot"
    );

    Ok(Screenshot {
        base64_data: general_purpose::STANDARD.encode(&png),
        width: img.width(),
        height: img.height(),
        size_bytes: png.len(),
    })
}

/// Capture a screenshot and write the raw PNG to a local file
pub async fn screenshot_to_file(runner: &AdbRunner, serial: &str, path: &Path) -> Result<usize> {
    let png = capture_png(runner, serial).await?;
    std::fs::write(path, &png)?;
    Ok(png.len())
}
