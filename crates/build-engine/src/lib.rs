//! React Native Build Engine
//!
//! Starts the processes that depend on a ready device: the Metro packager
//! and the `run-android` build.

pub mod packager;
pub mod runner;

pub use packager::{check_port, Packager, PackagerStatus, PortStatus};
pub use runner::AppRunner;

use rn_droid_core::ProcessError;

/// Build engine errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Process(#[from] ProcessError),
}
