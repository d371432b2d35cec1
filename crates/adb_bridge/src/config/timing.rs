//! Timeout and delay configuration for bridge operations

use lazy_static::lazy_static;
use std::env;

/// Timeouts (seconds) for bounded adb invocations
#[derive(Debug, Clone)]
pub struct RunnerTimingConfig {
    pub list_devices_timeout: u64,
    pub ui_dump_timeout: u64,
    pub screenshot_timeout: u64,
    pub pull_timeout: u64,
    pub shell_timeout: u64,
}

impl Default for RunnerTimingConfig {
    fn default() -> Self {
        Self {
            list_devices_timeout: env::var("ADB_BRIDGE_LIST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            ui_dump_timeout: env::var("ADB_BRIDGE_UI_DUMP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            screenshot_timeout: env::var("ADB_BRIDGE_SCREENSHOT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            pull_timeout: env::var("ADB_BRIDGE_PULL_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            shell_timeout: env::var("ADB_BRIDGE_SHELL_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Delays (seconds) inserted after input injection so the UI can settle
#[derive(Debug, Clone)]
pub struct InputTimingConfig {
    pub tap_delay: f64,
    pub double_tap_interval: f64,
    pub swipe_delay: f64,
    pub key_delay: f64,
    pub launch_delay: f64,
}

impl Default for InputTimingConfig {
    fn default() -> Self {
        Self {
            tap_delay: env::var("ADB_BRIDGE_TAP_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
            double_tap_interval: env::var("ADB_BRIDGE_DOUBLE_TAP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.1),
            swipe_delay: env::var("ADB_BRIDGE_SWIPE_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
            key_delay: env::var("ADB_BRIDGE_KEY_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.3),
            launch_delay: env::var("ADB_BRIDGE_LAUNCH_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
        }
    }
}

/// Recording lifecycle timing
#[derive(Debug, Clone)]
pub struct RecordingTimingConfig {
    /// Wait after SIGINT for screenrecord to flush the moov atom
    pub flush_delay: f64,
}

impl Default for RecordingTimingConfig {
    fn default() -> Self {
        Self {
            flush_delay: env::var("ADB_BRIDGE_RECORD_FLUSH_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.0),
        }
    }
}

/// Master timing configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub runner: RunnerTimingConfig,
    pub input: InputTimingConfig,
    pub recording: RecordingTimingConfig,
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}
