//! Toolchain Detection
//!
//! Verifies that the external binaries rn-droid drives are installed and
//! resolves them to absolute paths.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rn_droid_core::APP_NAME;
use tracing::{debug, info};

pub const REACT_NATIVE_BIN: &str = "react-native";
pub const EMULATOR_BIN: &str = "emulator";
pub const ADB_BIN: &str = "adb";

/// Where to send users whose environment is incomplete
pub const SETUP_GUIDE_URL: &str = "https://reactnative.dev/docs/environment-setup";

/// Toolchain detection errors
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("{} requires {binary}.", APP_NAME)]
    MissingBinary {
        binary: String,
        #[source]
        source: which::Error,
    },
}

impl DetectionError {
    /// Name of the binary that could not be found
    pub fn binary(&self) -> &str {
        match self {
            DetectionError::MissingBinary { binary, .. } => binary,
        }
    }
}

/// Resolved locations of the required binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub react_native: PathBuf,
    pub emulator: PathBuf,
    pub adb: PathBuf,
}

impl Toolchain {
    /// Directory holding the emulator binary. The emulator has to be started
    /// from there to find its resources.
    pub fn emulator_dir(&self) -> Option<&Path> {
        self.emulator.parent()
    }
}

/// Toolchain detector
#[derive(Debug, Clone, Default)]
pub struct ToolchainDetector {
    /// Overrides `PATH` when set
    search_path: Option<OsString>,
}

impl ToolchainDetector {
    /// Detector searching the process `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector searching the given `PATH`-style list instead
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Resolve a single binary
    pub fn require(&self, binary: &str) -> Result<PathBuf, DetectionError> {
        let resolved = match self.search_path {
            Some(ref paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(binary, Some(paths), cwd)
            }
            None => which::which(binary),
        };

        match resolved {
            Ok(path) => {
                debug!("Found {} at {:?}", binary, path);
                Ok(path)
            }
            Err(source) => Err(DetectionError::MissingBinary {
                binary: binary.to_string(),
                source,
            }),
        }
    }

    /// Resolve every required binary, stopping at the first missing one
    pub fn detect(&self) -> Result<Toolchain, DetectionError> {
        info!("Checking required binaries...");

        // Field order is the check order
        Ok(Toolchain {
            react_native: self.require(REACT_NATIVE_BIN)?,
            emulator: self.require(EMULATOR_BIN)?,
            adb: self.require(ADB_BIN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_binary(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(if cfg!(windows) {
            format!("{}.exe", name)
        } else {
            name.to_string()
        });
        fs::write(&path, "#!/bin/sh\n").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        path
    }

    #[test]
    fn test_detects_all_binaries() {
        let bin = tempfile::tempdir().unwrap();
        let sdk = tempfile::tempdir().unwrap();
        fake_binary(bin.path(), REACT_NATIVE_BIN);
        fake_binary(bin.path(), ADB_BIN);
        let emulator = fake_binary(sdk.path(), EMULATOR_BIN);

        let search = std::env::join_paths([bin.path(), sdk.path()]).unwrap();
        let toolchain = ToolchainDetector::with_search_path(search).detect().unwrap();

        assert_eq!(toolchain.emulator, emulator);
        assert_eq!(toolchain.emulator_dir(), Some(sdk.path()));
        assert!(toolchain.adb.starts_with(bin.path()));
    }

    #[test]
    fn test_reports_first_missing_binary() {
        let bin = tempfile::tempdir().unwrap();
        fake_binary(bin.path(), REACT_NATIVE_BIN);

        let err = ToolchainDetector::with_search_path(bin.path())
            .detect()
            .unwrap_err();

        assert_eq!(err.binary(), EMULATOR_BIN);
        assert_eq!(err.to_string(), "rn-droid requires emulator.");
    }
}
