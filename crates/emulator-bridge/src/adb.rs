//! ADB (Android Debug Bridge) Client
//!
//! Device state probes and the few adb commands needed to bring an emulator
//! up. Everything goes through the `adb` binary.

use std::path::PathBuf;
use std::sync::Arc;

use rn_droid_core::{CommandRunner, CommandSpec, ProcessError, Probe};
use tracing::debug;

use crate::device::{self, Device};

/// Intent broadcast to check whether the system has finished booting
pub const BOOT_COMPLETED_ACTION: &str = "android.intent.action.BOOT_COMPLETED";

/// Token in the broadcast reply that marks a booted system
const BOOT_COMPLETED_TOKEN: &str = "BOOT_COMPLETED";

/// ADB Client
#[derive(Clone)]
pub struct AdbClient {
    adb: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl AdbClient {
    /// Create a client for the adb binary at `adb`
    pub fn new(adb: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self { adb, runner }
    }

    fn command(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(&self.adb).args(args.iter().copied())
    }

    /// Run an ADB command and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String, ProcessError> {
        let spec = self.command(args);
        self.runner.output(&spec).await?.into_stdout(&spec)
    }

    /// List connected devices
    pub async fn list_devices(&self) -> Result<Vec<Device>, ProcessError> {
        let output = self.run(&["devices"]).await?;
        Ok(device::parse_devices(&output))
    }

    /// Serial of the first emulator in the `device` state, if any
    pub async fn attached_emulator(&self) -> Result<Option<String>, ProcessError> {
        Ok(self
            .list_devices()
            .await?
            .into_iter()
            .find(Device::is_attached_emulator)
            .map(|device| device.serial))
    }

    /// Probe whether an emulator is attached and in the `device` state.
    /// An adb failure is inconclusive.
    pub async fn attached_probe(&self) -> Probe {
        match self.run(&["devices"]).await {
            Ok(output) => {
                for device in device::parse_devices(&output) {
                    debug!("adb sees {} ({})", device.serial, device.state.as_str());
                }
                Probe::from(device::emulator_attached(&output))
            }
            Err(e) => Probe::Inconclusive(e.to_string()),
        }
    }

    /// One-shot check used at start-up
    pub async fn is_emulator_attached(&self) -> bool {
        self.attached_probe().await.is_ready()
    }

    /// Probe boot completion by broadcasting `BOOT_COMPLETED` and looking for
    /// the action in the reply. While the device is still starting the
    /// command usually fails outright, which is inconclusive rather than
    /// fatal.
    pub async fn boot_completed_probe(&self) -> Probe {
        match self
            .run(&["shell", "am", "broadcast", "-a", BOOT_COMPLETED_ACTION])
            .await
        {
            Ok(reply) => Probe::from(reply.contains(BOOT_COMPLETED_TOKEN)),
            Err(e) => Probe::Inconclusive(e.to_string()),
        }
    }

    /// Restart adbd with root permissions
    pub async fn root(&self) -> Result<String, ProcessError> {
        self.run(&["root"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_droid_core::testing::ScriptedRunner;

    const BROADCAST: &str = "adb shell am broadcast -a android.intent.action.BOOT_COMPLETED";

    fn client(runner: ScriptedRunner) -> AdbClient {
        AdbClient::new(PathBuf::from("/sdk/platform-tools/adb"), Arc::new(runner))
    }

    #[tokio::test]
    async fn test_attached_probe() {
        let adb = client(ScriptedRunner::new().respond_seq(
            "adb devices",
            &[
                "List of devices attached\nemulator-5554\toffline\n",
                "List of devices attached\nemulator-5554\tdevice\n",
            ],
        ));

        assert_eq!(adb.attached_probe().await, Probe::Pending);
        assert_eq!(adb.attached_probe().await, Probe::Ready);
    }

    #[tokio::test]
    async fn test_attached_probe_adb_failure_is_inconclusive() {
        let adb = client(ScriptedRunner::new().exit("adb devices", 1));

        assert!(matches!(adb.attached_probe().await, Probe::Inconclusive(_)));
        assert!(!adb.is_emulator_attached().await);
    }

    #[tokio::test]
    async fn test_boot_completed_probe() {
        let runner = ScriptedRunner::new()
            .spawn_error(BROADCAST)
            .respond(BROADCAST, "")
            .respond(
                BROADCAST,
                "Broadcasting: Intent { act=android.intent.action.BOOT_COMPLETED flg=0x400000 }\n\
                 Broadcast completed: result=0\n",
            );
        let adb = client(runner);

        assert!(matches!(adb.boot_completed_probe().await, Probe::Inconclusive(_)));
        assert_eq!(adb.boot_completed_probe().await, Probe::Pending);
        assert_eq!(adb.boot_completed_probe().await, Probe::Ready);
    }

    #[tokio::test]
    async fn test_attached_emulator_serial() {
        let adb = client(ScriptedRunner::new().respond(
            "adb devices",
            "List of devices attached\nR58M123ABC\tdevice\nemulator-5554\toffline\nemulator-5556\tdevice\n",
        ));

        assert_eq!(adb.list_devices().await.unwrap().len(), 3);
        assert_eq!(adb.attached_emulator().await.unwrap().as_deref(), Some("emulator-5556"));
    }

    #[tokio::test]
    async fn test_attached_emulator_none() {
        let adb = client(
            ScriptedRunner::new().respond("adb devices", "List of devices attached\nemulator-5554\toffline\n"),
        );

        assert_eq!(adb.attached_emulator().await.unwrap(), None);
    }
}
