//! Input injection: taps, swipes, key events, text entry
//!
//! Plain passthroughs to `adb shell input`. Each call sleeps briefly
//! afterwards so the UI has settled before the caller captures or
//! queries the next frame.

use crate::adb::screen::{screen_specs, ScreenSpecs};
use crate::config::{resolve_keycode, TIMING_CONFIG};
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use std::time::Duration;

const SCROLL_DURATION_MS: u32 = 300;

async fn shell_input(runner: &AdbRunner, serial: &str, args: &[&str]) -> Result<()> {
    let timeout = Duration::from_secs(TIMING_CONFIG.runner.shell_timeout);
    let mut full = vec!["shell", "input"];
    full.extend_from_slice(args);
    runner
        .run(Some(serial), &full, Some(timeout))
        .await?
        .require_success()?;
    Ok(())
}

async fn settle(delay: f64) {
    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
}

/// Tap at the specified coordinates
pub async fn tap(runner: &AdbRunner, serial: &str, x: i32, y: i32) -> Result<()> {
    shell_input(runner, serial, &["tap", &x.to_string(), &y.to_string()]).await?;
    settle(TIMING_CONFIG.input.tap_delay).await;
    Ok(())
}

/// Double tap at the specified coordinates
pub async fn double_tap(runner: &AdbRunner, serial: &str, x: i32, y: i32) -> Result<()> {
    let (x, y) = (x.to_string(), y.to_string());
    shell_input(runner, serial, &["tap", &x, &y]).await?;
    settle(TIMING_CONFIG.input.double_tap_interval).await;
    shell_input(runner, serial, &["tap", &x, &y]).await?;
    settle(TIMING_CONFIG.input.tap_delay).await;
    Ok(())
}

/// Long press: a swipe that starts and ends on the same point
pub async fn long_press(
    runner: &AdbRunner,
    serial: &str,
    x: i32,
    y: i32,
    duration_ms: u32,
) -> Result<()> {
    let (x, y) = (x.to_string(), y.to_string());
    shell_input(
        runner,
        serial,
        &["swipe", &x, &y, &x, &y, &duration_ms.to_string()],
    )
    .await?;
    settle(TIMING_CONFIG.input.tap_delay).await;
    Ok(())
}

/// Swipe from start to end coordinates
pub async fn swipe(
    runner: &AdbRunner,
    serial: &str,
    start: (i32, i32),
    end: (i32, i32),
    duration_ms: u32,
) -> Result<()> {
    shell_input(
        runner,
        serial,
        &[
            "swipe",
            &start.0.to_string(),
            &start.1.to_string(),
            &end.0.to_string(),
            &end.1.to_string(),
            &duration_ms.to_string(),
        ],
    )
    .await?;
    settle(TIMING_CONFIG.input.swipe_delay).await;
    Ok(())
}

/// One scroll step covers the middle 40% of the screen, keeping the
/// gesture clear of system gesture zones at both edges
fn scroll_gesture(specs: ScreenSpecs, down: bool) -> ((i32, i32), (i32, i32)) {
    let x = (specs.width_px / 2) as i32;
    let near = (specs.height_px as f64 * 0.3) as i32;
    let far = (specs.height_px as f64 * 0.7) as i32;
    if down {
        ((x, far), (x, near))
    } else {
        ((x, near), (x, far))
    }
}

/// Scroll the current screen down by one step
pub async fn scroll_down(runner: &AdbRunner, serial: &str) -> Result<()> {
    let specs = screen_specs(runner, serial).await?;
    let (start, end) = scroll_gesture(specs, true);
    swipe(runner, serial, start, end, SCROLL_DURATION_MS).await
}

/// Scroll the current screen up by one step
pub async fn scroll_up(runner: &AdbRunner, serial: &str) -> Result<()> {
    let specs = screen_specs(runner, serial).await?;
    let (start, end) = scroll_gesture(specs, false);
    swipe(runner, serial, start, end, SCROLL_DURATION_MS).await
}

/// Escape text for `input text`: spaces become `%s`, shell
/// metacharacters get backslashed
fn escape_input_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(' ', "%s")
        .replace('&', "\\&")
        .replace('<', "\\<")
        .replace('>', "\\>")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace(';', "\\;")
}

/// Type text into the currently focused field
pub async fn type_text(runner: &AdbRunner, serial: &str, text: &str) -> Result<()> {
    let escaped = escape_input_text(text);
    shell_input(runner, serial, &["text", &escaped]).await?;
    settle(TIMING_CONFIG.input.key_delay).await;
    Ok(())
}

/// Press a key by name (`BACK`, `ENTER`, …) or raw keycode number
pub async fn press_key(runner: &AdbRunner, serial: &str, key: &str) -> Result<()> {
    let code = resolve_keycode(key)
        .ok_or_else(|| BridgeError::CommandFailed(format!("unknown key: {}", key)))?;
    shell_input(runner, serial, &["keyevent", &code.to_string()]).await?;
    settle(TIMING_CONFIG.input.key_delay).await;
    Ok(())
}

/// Press the back button
pub async fn back(runner: &AdbRunner, serial: &str) -> Result<()> {
    press_key(runner, serial, "BACK").await
}

/// Press the home button
pub async fn home(runner: &AdbRunner, serial: &str) -> Result<()> {
    press_key(runner, serial, "HOME").await
}

/// Clear the focused text field by seeking to the end and deleting
pub async fn clear_text_field(runner: &AdbRunner, serial: &str, max_chars: u32) -> Result<()> {
    shell_input(runner, serial, &["keyevent", "KEYCODE_MOVE_END"]).await?;
    for _ in 0..max_chars {
        shell_input(runner, serial, &["keyevent", "67"]).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_spaces() {
        assert_eq!(escape_input_text("hello world"), "hello%sworld");
    }

    #[test]
    fn test_escape_shell_metacharacters() {
        assert_eq!(escape_input_text("a&b"), "a\\&b");
        assert_eq!(escape_input_text("<tag>"), "\\<tag\\>");
        assert_eq!(escape_input_text("it's"), "it\\'s");
    }

    #[test]
    fn test_escape_backslash_first() {
        // A literal backslash must not double-escape what follows
        assert_eq!(escape_input_text("a\\b"), "a\\\\b");
    }

    const SPECS: ScreenSpecs = ScreenSpecs {
        width_px: 1080,
        height_px: 2400,
        density_dpi: 440,
    };

    #[test]
    fn test_scroll_down_swipes_toward_top() {
        let (start, end) = scroll_gesture(SPECS, true);
        assert_eq!(start, (540, 1680));
        assert_eq!(end, (540, 720));
    }

    #[test]
    fn test_scroll_up_swipes_toward_bottom() {
        let (start, end) = scroll_gesture(SPECS, false);
        assert_eq!(start, (540, 720));
        assert_eq!(end, (540, 1680));
    }
}
