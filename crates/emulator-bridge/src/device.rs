//! Device Types and State
//!
//! Devices as reported by `adb devices`.

use once_cell::sync::Lazy;
use regex::Regex;

/// An emulator serial in the `device` state. Other states (`offline`,
/// `unauthorized`, ...) mean adb sees the emulator but cannot use it yet.
static ATTACHED_EMULATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^emulator-\d+\s+device\b").expect("valid regex"));

/// State token of an `adb devices` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// `device`: usable
    Online,
    Offline,
    /// Debugging not yet accepted on the device
    Unauthorized,
    Unknown,
}

impl DeviceState {
    pub fn parse(token: &str) -> Self {
        match token {
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            _ => DeviceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Online => "device",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Unknown => "unknown",
        }
    }
}

/// A device line of `adb devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
}

impl Device {
    /// Emulators register with adb as `emulator-<console port>`
    pub fn is_emulator(&self) -> bool {
        self.serial.starts_with("emulator-")
    }

    /// An emulator adb can talk to
    pub fn is_attached_emulator(&self) -> bool {
        self.is_emulator() && self.state == DeviceState::Online
    }
}

/// Whether `adb devices` output lists an emulator in the `device` state
pub fn emulator_attached(devices_output: &str) -> bool {
    ATTACHED_EMULATOR.is_match(devices_output)
}

/// Parse `adb devices` output, skipping the header and daemon chatter
pub fn parse_devices(devices_output: &str) -> Vec<Device> {
    devices_output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('*') && !line.starts_with("List of devices"))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = DeviceState::parse(parts.next()?);

            Some(Device {
                serial: serial.to_string(),
                state,
            })
        })
        .collect()
}
