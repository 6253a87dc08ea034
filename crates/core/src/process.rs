//! External process execution
//!
//! Every interaction with `emulator`, `adb` and `react-native` goes through a
//! [`CommandRunner`], so the readiness logic can be driven without real
//! binaries.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProcessError;

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory; inherits ours when unset
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// File name of the program, for messages
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program_name())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout of a successful run, or a [`ProcessError::Failed`]
    pub fn into_stdout(self, spec: &CommandSpec) -> Result<String, ProcessError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(ProcessError::Failed {
                program: spec.program_name(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Executes external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture stdout and stderr as text
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError>;

    /// Start a long-running process detached from our terminal and return
    /// immediately
    async fn spawn_detached(&self, spec: &CommandSpec) -> Result<(), ProcessError>;

    /// Start a long-running process whose stdout and stderr go to our
    /// terminal and return immediately
    async fn spawn_forwarded(&self, spec: &CommandSpec) -> Result<(), ProcessError>;

    /// Run with stdout and stderr going to our terminal and wait for it to
    /// exit. Returns the exit code, `None` when killed by a signal.
    async fn run_forwarded(&self, spec: &CommandSpec) -> Result<Option<i32>, ProcessError>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: spec.program_name(),
            source,
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        debug!("exec: {}", spec);

        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Self::spawn_error(spec, e))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn spawn_detached(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        debug!("spawn detached: {}", spec);

        let mut command = spec.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Keep the emulator alive when the terminal sends SIGINT to our group
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| Self::spawn_error(spec, e))?;
        debug!("spawned {} (pid {:?})", spec.program_name(), child.id());
        Ok(())
    }

    async fn spawn_forwarded(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        debug!("spawn: {}", spec);

        let child = spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;
        debug!("spawned {} (pid {:?})", spec.program_name(), child.id());
        Ok(())
    }

    async fn run_forwarded(&self, spec: &CommandSpec) -> Result<Option<i32>, ProcessError> {
        debug!("run: {}", spec);

        let mut child = spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        let status = child.wait().await?;
        debug!("{} exited with {}", spec.program_name(), status);
        Ok(status.code())
    }
}
