//! Android Emulator Bridge
//!
//! Lists Android Virtual Devices, probes device state through adb and
//! launches emulator instances.

pub mod adb;
pub mod avd;
pub mod device;
pub mod emulator;

pub use adb::{AdbClient, BOOT_COMPLETED_ACTION};
pub use avd::{AvdError, AvdManager};
pub use device::{Device, DeviceState};
pub use emulator::{EmulatorError, EmulatorLauncher, EmulatorOptions, LaunchProgress};
