//! Terminal status lines
//!
//! Progress goes to stdout, failures to stderr. Diagnostics for developers
//! go through `tracing` instead.

use console::style;
use rn_droid_android_toolchain::SETUP_GUIDE_URL;
use rn_droid_emulator_bridge::LaunchProgress;

use crate::error::RunError;

pub fn status(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).blue());
}

pub fn success(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).green());
}

pub fn warn(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).red());
}

/// Report a failed run, with a pointer to the setup guide when the
/// environment is incomplete
pub fn failure(err: &RunError) {
    eprintln!("{} {}", style("error:").red().bold(), style(err.user_message()).red());
    if err.needs_setup() {
        eprintln!(
            "{} {} for installation/setup instructions",
            style("Please refer to").red(),
            style(SETUP_GUIDE_URL).blue()
        );
    }
}

/// Print emulator launch stages
pub fn launch_progress(stage: LaunchProgress) {
    match stage {
        LaunchProgress::Starting { avd_name } => {
            status(format!("Starting emulator for device {} ...", avd_name))
        }
        LaunchProgress::WaitingForDevice => status("Checking device running..."),
        LaunchProgress::DeviceRunning { serial: Some(serial) } => {
            success(format!("Device is running! ({})", serial))
        }
        LaunchProgress::DeviceRunning { serial: None } => success("Device is running!"),
        LaunchProgress::WaitingForBoot => status("Checking boot completed..."),
        LaunchProgress::BootCompleted => success("Device is boot completed!"),
    }
}
