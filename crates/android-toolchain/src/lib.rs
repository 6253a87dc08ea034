//! Android Toolchain Management
//!
//! Checks that the command line tools rn-droid drives are installed:
//! - React Native CLI
//! - Android emulator
//! - adb (platform tools)

pub mod detector;

pub use detector::{
    DetectionError, Toolchain, ToolchainDetector, ADB_BIN, EMULATOR_BIN, REACT_NATIVE_BIN,
    SETUP_GUIDE_URL,
};
