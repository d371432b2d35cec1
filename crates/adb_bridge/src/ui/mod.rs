//! UI hierarchy capture and structural queries
//!
//! This module provides:
//! - `tree`: The parsed hierarchy model and its query surface
//! - [`capture_tree`]: Dump the on-screen hierarchy of a device and
//!   parse it into a [`UiTree`]

mod tree;

pub use tree::{Bounds, Clickable, PreOrder, UiNode, UiTree};

use crate::config::TIMING_CONFIG;
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use std::time::Duration;
use tracing::debug;

const DEVICE_DUMP_PATH: &str = "/sdcard/ui_dump.xml";

/// Capture the current view hierarchy of a device.
///
/// Triggers a uiautomator dump on the device, reads the document back
/// and parses it. The returned tree is an immutable snapshot of one
/// visual frame; run queries against it rather than re-capturing.
pub async fn capture_tree(runner: &AdbRunner, serial: &str) -> Result<UiTree> {
    let timeout = Duration::from_secs(TIMING_CONFIG.runner.ui_dump_timeout);

    let dump = runner
        .run(
            Some(serial),
            &["shell", "uiautomator", "dump", DEVICE_DUMP_PATH],
            Some(timeout),
        )
        .await?;
    if dump.stdout.contains("ERROR") || dump.stderr.contains("ERROR") {
        return Err(BridgeError::CaptureFailed(format!(
            "uiautomator dump failed on {}: {}",
            serial,
            dump.stderr.trim()
        )));
    }

    let document = runner
        .run(
            Some(serial),
            &["shell", "cat", DEVICE_DUMP_PATH],
            Some(timeout),
        )
        .await?
        .require_success()?;

    // Leftover dump files confuse subsequent captures; cleanup failure
    // is not worth surfacing
    let _ = runner
        .run(
            Some(serial),
            &["shell", "rm", DEVICE_DUMP_PATH],
            Some(Duration::from_secs(5)),
        )
        .await;

    debug!(bytes = document.stdout.len(), serial, "retrieved ui dump");

    UiTree::parse(&document.stdout).ok_or_else(|| {
        BridgeError::CaptureFailed(format!("empty or unparseable ui dump from {}", serial))
    })
}

/// Scroll down until an element whose text contains `query` is on
/// screen, up to `max_scrolls` steps.
///
/// Each step captures a fresh hierarchy before scrolling, so text that
/// is already visible returns without any gesture. `None` means the
/// text never appeared, which is an ordinary outcome for a list that
/// simply does not contain it.
pub async fn scroll_to_text(
    runner: &AdbRunner,
    serial: &str,
    query: &str,
    max_scrolls: u32,
) -> Result<Option<UiNode>> {
    for step in 0..max_scrolls {
        let tree = capture_tree(runner, serial).await?;
        if let Some(node) = tree.find_by_text(query, false) {
            debug!(query, step, "text found while scrolling");
            return Ok(Some(node.clone()));
        }
        crate::adb::input::scroll_down(runner, serial).await?;
    }
    Ok(None)
}
