//! ADB-facing modules for Android device control
//!
//! This module provides:
//! - `runner`: Subprocess execution against the adb binary
//! - `resolver`: Device enumeration and target resolution
//! - `screenshot`: Screen capture
//! - `input`: Input injection (tap, swipe, keys, text)
//! - `apps`: App lifecycle passthroughs
//! - `logs`: Logcat retrieval
//! - `screen`: Screen metrics
//! - `files`: File transfer and raw shell access

pub mod apps;
pub mod files;
pub mod input;
pub mod logs;
mod resolver;
mod runner;
pub mod screen;
mod screenshot;

pub use resolver::{list_devices, resolve, Device, DeviceState, Transport};
pub use runner::{AdbRunner, CommandOutput};
pub use screen::{screen_specs, ScreenSpecs};
pub use screenshot::{screenshot, screenshot_to_file, Screenshot};
