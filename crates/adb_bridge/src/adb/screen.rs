//! Screen metrics read from the window manager

use crate::config::TIMING_CONFIG;
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;

lazy_static! {
    static ref PHYSICAL_SIZE: Regex = Regex::new(r"Physical size: (\d+)x(\d+)").unwrap();
    static ref OVERRIDE_SIZE: Regex = Regex::new(r"Override size: (\d+)x(\d+)").unwrap();
    static ref DENSITY: Regex = Regex::new(r"density: (\d+)").unwrap();
}

/// Effective screen dimensions and density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenSpecs {
    pub width_px: u32,
    pub height_px: u32,
    pub density_dpi: u32,
}

fn parse_size(wm_size: &str) -> Option<(u32, u32)> {
    // An override, when present, is what apps actually render at
    let caps = OVERRIDE_SIZE
        .captures(wm_size)
        .or_else(|| PHYSICAL_SIZE.captures(wm_size))?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn parse_density(wm_density: &str) -> Option<u32> {
    DENSITY.captures(wm_density)?[1].parse().ok()
}

/// Read the effective screen specs of a device
pub async fn screen_specs(runner: &AdbRunner, serial: &str) -> Result<ScreenSpecs> {
    let timeout = Duration::from_secs(TIMING_CONFIG.runner.shell_timeout);

    let size = runner
        .run(Some(serial), &["shell", "wm", "size"], Some(timeout))
        .await?
        .require_success()?;
    let density = runner
        .run(Some(serial), &["shell", "wm", "density"], Some(timeout))
        .await?
        .require_success()?;

    let (width_px, height_px) = parse_size(&size.stdout).ok_or_else(|| {
        BridgeError::CommandFailed(format!("unparseable wm size output: {}", size.stdout.trim()))
    })?;

    Ok(ScreenSpecs {
        width_px,
        height_px,
        density_dpi: parse_density(&density.stdout).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_physical_size() {
        assert_eq!(parse_size("Physical size: 1080x2400\n"), Some((1080, 2400)));
    }

    #[test]
    fn test_parse_override_preferred() {
        let out = "Physical size: 1080x2400\nOverride size: 720x1600\n";
        assert_eq!(parse_size(out), Some((720, 1600)));
    }

    #[test]
    fn test_parse_size_garbage() {
        assert_eq!(parse_size("no sizes here"), None);
    }

    #[test]
    fn test_parse_density() {
        assert_eq!(parse_density("Physical density: 440\n"), Some(440));
    }
}
