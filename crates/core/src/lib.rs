//! rn-droid Core - configuration, process execution and readiness polling
//!
//! Shared building blocks for the rn-droid crates: the run configuration,
//! the [`CommandRunner`] seam through which every external binary is
//! invoked, and the generic readiness poller.

pub mod config;
pub mod error;
pub mod poll;
pub mod process;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{LaunchConfig, RunOptions};
pub use error::{PollError, ProcessError};
pub use poll::{poll_until, PollOutcome, PollPolicy, Probe};
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};

/// rn-droid version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "rn-droid";
