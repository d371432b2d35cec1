//! Configuration module for adb_bridge
//!
//! This module contains:
//! - `keycodes`: Key name to Android keycode mappings
//! - `timing`: Timeout and delay configurations for bridge operations

mod keycodes;
mod timing;

pub use keycodes::{resolve_keycode, KEYCODES};
pub use timing::{
    InputTimingConfig, RecordingTimingConfig, RunnerTimingConfig, TimingConfig, TIMING_CONFIG,
};
