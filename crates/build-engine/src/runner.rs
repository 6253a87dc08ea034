//! App Runner
//!
//! Builds, installs and launches the app with `react-native run-android`.

use std::path::PathBuf;
use std::sync::Arc;

use rn_droid_core::config::DEFAULT_PACKAGER_PORT;
use rn_droid_core::{CommandRunner, CommandSpec};
use tracing::info;

use crate::BuildError;

/// Runs the app build on the attached device
pub struct AppRunner {
    react_native: PathBuf,
    runner: Arc<dyn CommandRunner>,
    packager_port: u16,
}

impl AppRunner {
    pub fn new(react_native: PathBuf, runner: Arc<dyn CommandRunner>, packager_port: u16) -> Self {
        Self {
            react_native,
            runner,
            packager_port,
        }
    }

    pub fn run_command(&self) -> CommandSpec {
        let spec = CommandSpec::new(&self.react_native).arg("run-android");
        if self.packager_port == DEFAULT_PACKAGER_PORT {
            spec
        } else {
            spec.args(["--port".to_string(), self.packager_port.to_string()])
        }
    }

    /// Run with output on our terminal until it exits. Returns its exit
    /// code, `None` when it was killed by a signal.
    pub async fn run(&self) -> Result<Option<i32>, BuildError> {
        let spec = self.run_command();
        info!("Running {}", spec);

        let code = self.runner.run_forwarded(&spec).await?;
        info!("{} exited with {:?}", spec, code);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_droid_core::testing::{InvocationKind, ScriptedRunner};

    #[tokio::test]
    async fn test_returns_exit_code() {
        let runner = Arc::new(ScriptedRunner::new().exit("react-native run-android", 2));
        let app = AppRunner::new(PathBuf::from("react-native"), runner.clone(), DEFAULT_PACKAGER_PORT);

        assert_eq!(app.run().await.unwrap(), Some(2));
        assert_eq!(
            runner.commands(InvocationKind::Run),
            vec!["react-native run-android"]
        );
    }

    #[test]
    fn test_custom_port_is_forwarded() {
        let runner = Arc::new(ScriptedRunner::new());
        let app = AppRunner::new(PathBuf::from("react-native"), runner, 8088);
        assert_eq!(app.run_command().to_string(), "react-native run-android --port 8088");
    }
}
