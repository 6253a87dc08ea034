//! rn-droid - one command from a cold Android emulator to a running
//! React Native app
//!
//! ## Architecture
//!
//! - `rn-droid-core`: run configuration, process execution, readiness polling
//! - `rn-droid-android-toolchain`: required binary detection
//! - `rn-droid-emulator-bridge`: AVD listing, adb probes, emulator launch
//! - `rn-droid-build-engine`: Metro packager and `run-android`

#![warn(clippy::all)]

pub mod commands;
pub mod error;
pub mod output;

// Re-export main components for library usage
pub use rn_droid_android_toolchain as toolchain;
pub use rn_droid_build_engine as build;
pub use rn_droid_emulator_bridge as emulator;

pub use commands::{DeviceSelector, FirstDevice, PromptSelector, RunCommand};
pub use error::RunError;
