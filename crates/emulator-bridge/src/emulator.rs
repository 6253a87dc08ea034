//! Emulator Launcher
//!
//! Starts an AVD and waits until it is usable: attached to adb, running adbd
//! as root, and done booting.

use std::path::PathBuf;
use std::sync::Arc;

use rn_droid_core::{
    poll_until, CommandRunner, CommandSpec, LaunchConfig, PollError, PollPolicy, ProcessError,
    RunOptions,
};
use tracing::{debug, info};

use crate::adb::AdbClient;

/// Emulator errors
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    #[error("failed to start emulator: {0}")]
    StartFailed(#[from] ProcessError),
    #[error("No device running ({0})")]
    NoDeviceRunning(#[source] PollError),
    #[error("Device did not finish booting ({0})")]
    BootTimeout(#[source] PollError),
}

/// Emulator launch options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmulatorOptions {
    /// Cold boot instead of restoring the quick-boot snapshot
    pub no_snapshot: bool,
    /// Mount the system partition writable
    pub writable_system: bool,
}

impl From<&RunOptions> for EmulatorOptions {
    fn from(options: &RunOptions) -> Self {
        Self {
            no_snapshot: options.no_snapshot,
            writable_system: options.writable,
        }
    }
}

impl EmulatorOptions {
    /// Command line arguments for starting `avd_name`
    pub fn to_args(&self, avd_name: &str) -> Vec<String> {
        let mut args = vec![format!("@{}", avd_name)];

        if self.no_snapshot {
            args.push("-no-snapshot-load".to_string());
        }

        if self.writable_system {
            args.push("-writable-system".to_string());
        }

        args
    }
}

/// Stage reached by a launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchProgress {
    Starting { avd_name: String },
    WaitingForDevice,
    /// `serial` is `None` when the follow-up listing failed
    DeviceRunning { serial: Option<String> },
    WaitingForBoot,
    BootCompleted,
}

type ProgressFn = Box<dyn Fn(LaunchProgress) + Send + Sync>;

/// Emulator launcher
pub struct EmulatorLauncher {
    emulator: PathBuf,
    adb: AdbClient,
    runner: Arc<dyn CommandRunner>,
    config: LaunchConfig,
    progress: Option<ProgressFn>,
}

impl EmulatorLauncher {
    /// Create a launcher for the emulator binary at `emulator`
    pub fn new(
        emulator: PathBuf,
        adb: AdbClient,
        runner: Arc<dyn CommandRunner>,
        config: LaunchConfig,
    ) -> Self {
        Self {
            emulator,
            adb,
            runner,
            config,
            progress: None,
        }
    }

    /// Report each stage to `progress`
    pub fn with_progress(mut self, progress: impl Fn(LaunchProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn report(&self, stage: LaunchProgress) {
        if let Some(ref progress) = self.progress {
            progress(stage);
        }
    }

    /// The emulator command for `avd_name`, run from the emulator's own
    /// directory so it finds its resources.
    pub fn launch_command(&self, avd_name: &str, options: &EmulatorOptions) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.emulator).args(options.to_args(avd_name));
        if let Some(dir) = self.emulator.parent() {
            spec = spec.current_dir(dir);
        }
        spec
    }

    /// Start the emulator in the background and wait until it has booted
    pub async fn launch(&self, avd_name: &str, options: &EmulatorOptions) -> Result<(), EmulatorError> {
        self.report(LaunchProgress::Starting {
            avd_name: avd_name.to_string(),
        });

        let spec = self.launch_command(avd_name, options);
        info!("Launching emulator {}", avd_name);
        debug!("Emulator args: {:?}", spec.args);
        self.runner.spawn_detached(&spec).await?;

        self.report(LaunchProgress::WaitingForDevice);
        let attach = PollPolicy::bounded(self.config.poll_interval, self.config.attach_timeout);
        let attached = poll_until("device attached", attach, || self.adb.attached_probe())
            .await
            .map_err(EmulatorError::NoDeviceRunning)?;
        let serial = match self.adb.attached_emulator().await {
            Ok(serial) => serial,
            Err(e) => {
                debug!("Could not list devices: {}", e);
                None
            }
        };
        info!(
            "Device {} attached after {:?}",
            serial.as_deref().unwrap_or("<unknown>"),
            attached.elapsed
        );
        self.report(LaunchProgress::DeviceRunning { serial });

        // Best effort, production images refuse it
        match self.adb.root().await {
            Ok(output) => debug!("adb root: {}", output.trim()),
            Err(e) => debug!("adb root failed, continuing: {}", e),
        }

        self.report(LaunchProgress::WaitingForBoot);
        let boot = PollPolicy {
            interval: self.config.poll_interval,
            timeout: self.config.boot_timeout,
        };
        let booted = poll_until("boot completed", boot, || self.adb.boot_completed_probe())
            .await
            .map_err(EmulatorError::BootTimeout)?;
        info!("Boot completed after {:?}", booted.elapsed);
        self.report(LaunchProgress::BootCompleted);

        Ok(())
    }
}
