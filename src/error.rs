//! Top-level error type
//!
//! Folds the crate errors into the failures a user can see.

use rn_droid_android_toolchain::DetectionError;
use rn_droid_build_engine::BuildError;
use rn_droid_core::ProcessError;
use rn_droid_emulator_bridge::{AvdError, EmulatorError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    MissingBinary(#[from] DetectionError),

    #[error("Please create a virtual device")]
    NoVirtualDevices,

    #[error(transparent)]
    Emulator(#[from] EmulatorError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("device selection failed: {0}")]
    Selection(String),
}

impl From<AvdError> for RunError {
    fn from(err: AvdError) -> Self {
        match err {
            AvdError::NoVirtualDevices => RunError::NoVirtualDevices,
            AvdError::Process(e) => RunError::Process(e),
        }
    }
}

impl RunError {
    /// Whether the fix is installing or configuring the Android/React
    /// Native environment
    pub fn needs_setup(&self) -> bool {
        matches!(self, RunError::MissingBinary(_) | RunError::NoVirtualDevices)
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            RunError::Process(ProcessError::Spawn { program, .. }) => {
                format!("Could not run {}. Is it installed correctly?", program)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_avds_needs_setup() {
        let err = RunError::from(AvdError::NoVirtualDevices);
        assert!(matches!(err, RunError::NoVirtualDevices));
        assert!(err.needs_setup());
        assert_eq!(err.user_message(), "Please create a virtual device");
    }

    #[test]
    fn test_spawn_failure_message() {
        let err = RunError::from(ProcessError::Spawn {
            program: "adb".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(!err.needs_setup());
        assert_eq!(err.user_message(), "Could not run adb. Is it installed correctly?");
    }
}
