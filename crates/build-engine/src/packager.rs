//! Metro packager
//!
//! Starts `react-native start` unless something already listens on the
//! packager port.

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::sync::Arc;

use rn_droid_core::config::DEFAULT_PACKAGER_PORT;
use rn_droid_core::{CommandRunner, CommandSpec};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::BuildError;

/// Result of probing a TCP port by binding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortStatus {
    Free,
    InUse,
    /// Binding failed for another reason
    Unknown(String),
}

async fn bind_status(addr: IpAddr, port: u16) -> PortStatus {
    match TcpListener::bind((addr, port)).await {
        Ok(listener) => {
            drop(listener);
            PortStatus::Free
        }
        Err(e) if e.kind() == ErrorKind::AddrInUse => PortStatus::InUse,
        Err(e) => PortStatus::Unknown(e.to_string()),
    }
}

/// Probe `port` on all IPv4 and IPv6 interfaces. A listener on either
/// family makes the port in use.
pub async fn check_port(port: u16) -> PortStatus {
    match bind_status(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port).await {
        PortStatus::Free => {}
        taken => return taken,
    }

    match bind_status(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port).await {
        PortStatus::InUse => PortStatus::InUse,
        PortStatus::Unknown(reason) => {
            // Hosts without IPv6 cannot have a listener there
            debug!("IPv6 bind on port {} failed: {}", port, reason);
            PortStatus::Free
        }
        PortStatus::Free => PortStatus::Free,
    }
}

/// What [`Packager::start`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagerStatus {
    Started,
    /// The port is taken, presumably by a packager
    AlreadyRunning,
    /// The port could not be checked; assumed taken
    Skipped { reason: String },
}

/// Metro packager launcher
pub struct Packager {
    react_native: PathBuf,
    runner: Arc<dyn CommandRunner>,
    port: u16,
}

impl Packager {
    pub fn new(react_native: PathBuf, runner: Arc<dyn CommandRunner>, port: u16) -> Self {
        Self {
            react_native,
            runner,
            port,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn start_command(&self) -> CommandSpec {
        let spec = CommandSpec::new(&self.react_native).arg("start");
        if self.port == DEFAULT_PACKAGER_PORT {
            spec
        } else {
            spec.args(["--port".to_string(), self.port.to_string()])
        }
    }

    /// Start the packager with its output on our terminal, unless the port
    /// is already taken. Does not wait for it to exit.
    pub async fn start(&self) -> Result<PackagerStatus, BuildError> {
        match check_port(self.port).await {
            PortStatus::Free => {}
            PortStatus::InUse => {
                info!("Port {} in use, not starting packager", self.port);
                return Ok(PackagerStatus::AlreadyRunning);
            }
            PortStatus::Unknown(reason) => {
                warn!("Could not check port {}: {}", self.port, reason);
                return Ok(PackagerStatus::Skipped { reason });
            }
        }

        let spec = self.start_command();
        debug!("Starting packager: {}", spec);
        self.runner.spawn_forwarded(&spec).await?;
        Ok(PackagerStatus::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_droid_core::testing::{InvocationKind, ScriptedRunner};

    fn packager(runner: &Arc<ScriptedRunner>, port: u16) -> Packager {
        Packager::new(PathBuf::from("/usr/local/bin/react-native"), runner.clone(), port)
    }

    async fn free_port() -> u16 {
        let listener = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_check_port() {
        let listener = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(check_port(port).await, PortStatus::InUse);

        drop(listener);
        assert_eq!(check_port(port).await, PortStatus::Free);
    }

    #[tokio::test]
    async fn test_check_port_sees_ipv6_loopback_listener() {
        let listener = match TcpListener::bind(("::1", 0)).await {
            Ok(listener) => listener,
            // No IPv6 loopback on this host
            Err(_) => return,
        };
        let port = listener.local_addr().unwrap().port();

        assert_eq!(check_port(port).await, PortStatus::InUse);

        let runner = Arc::new(ScriptedRunner::new());
        let status = packager(&runner, port).start().await.unwrap();
        assert_eq!(status, PackagerStatus::AlreadyRunning);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skips_when_port_taken() {
        let listener = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let runner = Arc::new(ScriptedRunner::new());

        let status = packager(&runner, port).start().await.unwrap();

        assert_eq!(status, PackagerStatus::AlreadyRunning);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_starts_when_port_free() {
        let port = free_port().await;
        let runner = Arc::new(ScriptedRunner::new());

        let status = packager(&runner, port).start().await.unwrap();

        assert_eq!(status, PackagerStatus::Started);
        assert_eq!(
            runner.commands(InvocationKind::Forwarded),
            vec![format!("react-native start --port {}", port)]
        );
    }

    #[test]
    fn test_default_port_command() {
        let runner = Arc::new(ScriptedRunner::new());
        let spec = packager(&runner, DEFAULT_PACKAGER_PORT).start_command();
        assert_eq!(spec.to_string(), "react-native start");
    }
}
