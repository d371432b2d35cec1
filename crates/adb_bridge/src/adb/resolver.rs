//! Device enumeration and target resolution
//!
//! Devices attach and detach between operations, so resolution always
//! re-queries `adb devices -l`; nothing here is cached.

use crate::config::TIMING_CONFIG;
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Connection state reported by `adb devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Online,
    Offline,
    Unauthorized,
    /// Any other state string adb may emit (e.g. `recovery`, `sideload`)
    Other(String),
}

impl DeviceState {
    fn parse(raw: &str) -> Self {
        match raw {
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            other => DeviceState::Other(other.to_string()),
        }
    }
}

/// Transport the device is attached over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Usb,
    Tcp,
}

/// An attached Android device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
    pub transport: Transport,
    pub model: Option<String>,
    pub product: Option<String>,
}

/// Parse the output of `adb devices -l`
fn parse_device_list(stdout: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in stdout.lines().skip(1) {
        // Skip header line
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let serial = parts[0].to_string();
        let state = DeviceState::parse(parts[1]);

        // Network-attached serials look like host:port
        let transport = if serial.contains(':') {
            Transport::Tcp
        } else {
            Transport::Usb
        };

        let mut model = None;
        let mut product = None;
        for part in &parts[2..] {
            if let Some(value) = part.strip_prefix("model:") {
                model = Some(value.to_string());
            } else if let Some(value) = part.strip_prefix("product:") {
                product = Some(value.to_string());
            }
        }

        devices.push(Device {
            serial,
            state,
            transport,
            model,
            product,
        });
    }

    devices
}

/// List all attached devices
pub async fn list_devices(runner: &AdbRunner) -> Result<Vec<Device>> {
    let timeout = Duration::from_secs(TIMING_CONFIG.runner.list_devices_timeout);
    let output = runner
        .run(None, &["devices", "-l"], Some(timeout))
        .await?
        .require_success()?;

    let devices = parse_device_list(&output.stdout);
    debug!(count = devices.len(), "enumerated devices");
    Ok(devices)
}

/// Apply the resolution rule to an already-enumerated device list.
///
/// Connection state plays no part here: an offline or unauthorized
/// device still occupies its serial, so it counts toward ambiguity
/// and resolves when it is the only one attached. Commands against it
/// fail with adb's own diagnostic, which tells the caller more than a
/// premature rejection would.
fn resolve_from(mut devices: Vec<Device>, explicit: Option<&str>) -> Result<Device> {
    if let Some(serial) = explicit {
        return devices
            .into_iter()
            .find(|d| d.serial == serial)
            .ok_or_else(|| BridgeError::UnknownDevice(serial.to_string()));
    }

    match devices.len() {
        0 => Err(BridgeError::NoDeviceAvailable),
        1 => Ok(devices.remove(0)),
        _ => Err(BridgeError::AmbiguousDevice {
            candidates: devices.iter().map(|d| d.serial.clone()).collect(),
        }),
    }
}

/// Resolve the device an operation targets.
///
/// With an explicit serial the device must be attached. Without one,
/// resolution only succeeds when exactly one device is attached;
/// ambiguity reports every attached serial so the caller can pick one
/// and retry.
pub async fn resolve(runner: &AdbRunner, explicit: Option<&str>) -> Result<Device> {
    let devices = list_devices(runner).await?;
    resolve_from(devices, explicit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_DEVICE: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_gphone64_x86_64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1\n";

    const TWO_DEVICES: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_gphone64_x86_64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1\n\
        192.168.1.42:5555      device product:raven model:Pixel_6_Pro device:raven transport_id:2\n";

    #[test]
    fn test_parse_single_device() {
        let devices = parse_device_list(ONE_DEVICE);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].state, DeviceState::Online);
        assert_eq!(devices[0].transport, Transport::Usb);
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64_x86_64"));
    }

    #[test]
    fn test_parse_tcp_transport() {
        let devices = parse_device_list(TWO_DEVICES);
        assert_eq!(devices[1].transport, Transport::Tcp);
        assert_eq!(devices[1].model.as_deref(), Some("Pixel_6_Pro"));
    }

    #[test]
    fn test_parse_unauthorized_state() {
        let out = "List of devices attached\nR58M123ABC\tunauthorized\n";
        let devices = parse_device_list(out);
        assert_eq!(devices[0].state, DeviceState::Unauthorized);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_device_list("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_resolve_single_device_implicitly() {
        let device = resolve_from(parse_device_list(ONE_DEVICE), None).unwrap();
        assert_eq!(device.serial, "emulator-5554");
    }

    #[test]
    fn test_resolve_ambiguous_lists_all_candidates() {
        match resolve_from(parse_device_list(TWO_DEVICES), None) {
            Err(BridgeError::AmbiguousDevice { candidates }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&"emulator-5554".to_string()));
                assert!(candidates.contains(&"192.168.1.42:5555".to_string()));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_no_devices() {
        match resolve_from(Vec::new(), None) {
            Err(BridgeError::NoDeviceAvailable) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_serial() {
        match resolve_from(parse_device_list(ONE_DEVICE), Some("nope")) {
            Err(BridgeError::UnknownDevice(serial)) => assert_eq!(serial, "nope"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_explicit_serial() {
        let device =
            resolve_from(parse_device_list(TWO_DEVICES), Some("192.168.1.42:5555")).unwrap();
        assert_eq!(device.transport, Transport::Tcp);
    }

    #[test]
    fn test_offline_device_counts_toward_ambiguity() {
        let out = "List of devices attached\n\
            emulator-5554\tdevice\n\
            R58M123ABC\toffline\n";
        match resolve_from(parse_device_list(out), None) {
            Err(BridgeError::AmbiguousDevice { candidates }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&"R58M123ABC".to_string()));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_single_offline_device_still_resolves() {
        let out = "List of devices attached\nR58M123ABC\toffline\n";
        let device = resolve_from(parse_device_list(out), None).unwrap();
        assert_eq!(device.serial, "R58M123ABC");
        assert_eq!(device.state, DeviceState::Offline);
    }
}
