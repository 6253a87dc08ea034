//! The run command
//!
//! Brings up a device and starts the React Native dev session on it.

use std::sync::Arc;

use dialoguer::Select;
use rn_droid_android_toolchain::Toolchain;
use rn_droid_build_engine::{AppRunner, Packager, PackagerStatus};
use rn_droid_core::{CommandRunner, LaunchConfig, RunOptions};
use rn_droid_emulator_bridge::{AdbClient, AvdManager, EmulatorLauncher, EmulatorOptions};
use tracing::info;

use crate::error::RunError;
use crate::output;

/// Chooses which AVD to boot
pub trait DeviceSelector {
    /// Pick one of `avds`, which is never empty
    fn select(&self, avds: &[String]) -> Result<String, RunError>;
}

/// Asks the user on the terminal
pub struct PromptSelector;

impl DeviceSelector for PromptSelector {
    fn select(&self, avds: &[String]) -> Result<String, RunError> {
        let selection = Select::new()
            .with_prompt("Which device would you like to use?")
            .items(avds)
            .default(0)
            .interact()
            .map_err(|e| RunError::Selection(e.to_string()))?;

        Ok(avds[selection].clone())
    }
}

/// Takes the first listed AVD, usually the first one created
pub struct FirstDevice;

impl DeviceSelector for FirstDevice {
    fn select(&self, avds: &[String]) -> Result<String, RunError> {
        avds.first().cloned().ok_or(RunError::NoVirtualDevices)
    }
}

/// Run command options
pub struct RunCommand {
    pub options: RunOptions,
    pub config: LaunchConfig,
}

impl RunCommand {
    pub fn new(options: RunOptions, config: LaunchConfig) -> Self {
        Self { options, config }
    }

    /// Execute the run command. Returns the exit code of
    /// `react-native run-android`.
    pub async fn execute(
        &self,
        toolchain: &Toolchain,
        runner: Arc<dyn CommandRunner>,
        selector: &dyn DeviceSelector,
    ) -> Result<Option<i32>, RunError> {
        let adb = AdbClient::new(toolchain.adb.clone(), runner.clone());
        let packager = Packager::new(
            toolchain.react_native.clone(),
            runner.clone(),
            self.config.packager_port,
        );
        let app = AppRunner::new(
            toolchain.react_native.clone(),
            runner.clone(),
            self.config.packager_port,
        );

        if adb.is_emulator_attached().await {
            output::success("Device is already running! Bypassing all options.");
            start_packager(&packager).await?;
            return start_app(&app).await;
        }

        let avds = AvdManager::new(toolchain.emulator.clone(), runner.clone())
            .list_avds()
            .await?;

        self.announce_modes();
        let avd_name = if self.options.use_default {
            FirstDevice.select(&avds)?
        } else {
            selector.select(&avds)?
        };
        info!("Selected AVD {}", avd_name);

        let launcher = EmulatorLauncher::new(
            toolchain.emulator.clone(),
            adb,
            runner,
            self.config.clone(),
        )
        .with_progress(output::launch_progress);
        let emulator_options = EmulatorOptions::from(&self.options);

        tokio::try_join!(
            async {
                launcher
                    .launch(&avd_name, &emulator_options)
                    .await
                    .map_err(RunError::from)
            },
            start_packager(&packager),
        )?;

        start_app(&app).await
    }

    fn announce_modes(&self) {
        if self.options.writable {
            output::success("Writable mode is selected");
        }
        if self.options.no_snapshot {
            output::success("NoSnapshot mode is selected");
        }
        if self.options.use_default {
            output::success("Default option is selected. First created emulator will be chosen.");
        }
    }
}

async fn start_packager(packager: &Packager) -> Result<PackagerStatus, RunError> {
    output::status("Starting react-native package server ...");

    let status = packager.start().await?;
    match status {
        PackagerStatus::Started => {}
        PackagerStatus::AlreadyRunning => output::warn(format!(
            "Port {} in use! Seems like package manager is already running!",
            packager.port()
        )),
        PackagerStatus::Skipped { ref reason } => output::warn(format!(
            "Could not check port {} ({}). Assuming package manager is already running!",
            packager.port(),
            reason
        )),
    }
    Ok(status)
}

async fn start_app(app: &AppRunner) -> Result<Option<i32>, RunError> {
    output::status("Starting react-native ...");
    Ok(app.run().await?)
}

/// Exit code to leave with after the app runner exited with `code`
pub fn exit_status_code(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok()).unwrap_or(1)
}
