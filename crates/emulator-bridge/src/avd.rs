//! AVD (Android Virtual Device) listing
//!
//! Enumerates the virtual devices the emulator knows about.

use std::path::PathBuf;
use std::sync::Arc;

use rn_droid_core::{CommandRunner, CommandSpec, ProcessError};
use tracing::{debug, info};

/// AVD errors
#[derive(Debug, thiserror::Error)]
pub enum AvdError {
    #[error("no Android virtual devices found")]
    NoVirtualDevices,
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// AVD Manager
#[derive(Clone)]
pub struct AvdManager {
    emulator: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl AvdManager {
    /// Create a manager for the emulator binary at `emulator`
    pub fn new(emulator: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self { emulator, runner }
    }

    /// List AVD names in the order the emulator reports them. Never empty:
    /// having no AVD at all is [`AvdError::NoVirtualDevices`].
    pub async fn list_avds(&self) -> Result<Vec<String>, AvdError> {
        let spec = CommandSpec::new(&self.emulator).arg("-list-avds");
        let output = self.runner.output(&spec).await?.into_stdout(&spec)?;

        let avds = parse_avd_list(&output);
        debug!("AVDs: {:?}", avds);

        if avds.is_empty() {
            return Err(AvdError::NoVirtualDevices);
        }

        info!("Found {} AVD(s)", avds.len());
        Ok(avds)
    }
}

/// One name per non-blank line, trimmed
pub fn parse_avd_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
