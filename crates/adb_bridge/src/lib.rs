//! adb_bridge: Android device automation over the adb command-line tool
//!
//! This library provides:
//! - Device enumeration and target resolution for multi-device setups
//! - UI hierarchy capture with structural queries (find by text or
//!   resource id, list clickable elements, extract on-screen text)
//! - Screen-recording session lifecycle with a hard duration ceiling
//! - Screenshot capture, input injection, and app/log passthroughs
//!
//! # Example
//!
//! ```no_run
//! use adb_bridge::{capture_tree, resolve, AdbRunner};
//!
//! #[tokio::main]
//! async fn main() -> adb_bridge::Result<()> {
//!     let runner = AdbRunner::new();
//!     let device = resolve(&runner, None).await?;
//!     let tree = capture_tree(&runner, &device.serial).await?;
//!
//!     if let Some(node) = tree.find_by_text("Login", false) {
//!         let (x, y) = node.bounds.center();
//!         adb_bridge::input::tap(&runner, &device.serial, x, y).await?;
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Device bridge
pub mod adb;

// UI hierarchy engine
pub mod ui;

// Recording lifecycle
pub mod recording;

// Re-export commonly used types and functions
pub use error::{BridgeError, Result};

// Config re-exports
pub use config::{resolve_keycode, TimingConfig, TIMING_CONFIG};

// ADB re-exports
pub use adb::{
    input, list_devices, resolve, screen_specs, screenshot, screenshot_to_file, AdbRunner,
    CommandOutput, Device, DeviceState, ScreenSpecs, Screenshot, Transport,
};

// UI re-exports
pub use ui::{capture_tree, scroll_to_text, Bounds, Clickable, UiNode, UiTree};

// Recording re-exports
pub use recording::{
    RecordingManager, SessionState, SessionStatus, MAX_RECORD_SECS,
};
