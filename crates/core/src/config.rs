//! Run Configuration
//!
//! Options and tunables for a single run. Built once at start-up from the
//! command line and passed read-only to the components that need them.
//! Nothing here is ever persisted.

use std::time::Duration;

/// Default bound on waiting for a launched emulator to attach to adb
pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(60);

/// Default bound on waiting for boot to complete once attached
pub const DEFAULT_BOOT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default delay between two readiness probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default Metro packager port
pub const DEFAULT_PACKAGER_PORT: u16 = 8081;

/// Flags selected by the user for this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Pick the first listed AVD instead of prompting
    pub use_default: bool,
    /// Launch the emulator with `-writable-system`
    pub writable: bool,
    /// Launch the emulator with `-no-snapshot-load`
    pub no_snapshot: bool,
}

/// Timing and port settings for a launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// How long to wait for the emulator to show up as an attached device
    pub attach_timeout: Duration,
    /// How long to wait for boot completion; `None` waits forever
    pub boot_timeout: Option<Duration>,
    /// Delay between readiness probes
    pub poll_interval: Duration,
    /// Port the packager listens on
    pub packager_port: u16,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            attach_timeout: DEFAULT_ATTACH_TIMEOUT,
            boot_timeout: Some(DEFAULT_BOOT_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            packager_port: DEFAULT_PACKAGER_PORT,
        }
    }
}

impl LaunchConfig {
    /// Build from raw command line values.
    ///
    /// A zero boot timeout means the boot wait is unbounded.
    pub fn from_raw(
        attach_timeout_secs: u64,
        boot_timeout_secs: u64,
        poll_interval_ms: u64,
        packager_port: u16,
    ) -> Self {
        Self {
            attach_timeout: Duration::from_secs(attach_timeout_secs),
            boot_timeout: (boot_timeout_secs > 0).then(|| Duration::from_secs(boot_timeout_secs)),
            poll_interval: Duration::from_millis(poll_interval_ms),
            packager_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LaunchConfig::default();
        assert_eq!(config.attach_timeout, Duration::from_secs(60));
        assert_eq!(config.boot_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.packager_port, 8081);
    }

    #[test]
    fn test_zero_boot_timeout_is_unbounded() {
        let config = LaunchConfig::from_raw(30, 0, 250, 9090);
        assert_eq!(config.attach_timeout, Duration::from_secs(30));
        assert_eq!(config.boot_timeout, None);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.packager_port, 9090);
    }
}
