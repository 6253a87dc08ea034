//! Scripted command runner for tests
//!
//! Responses are keyed by the command line as displayed (`adb devices`,
//! `emulator -list-avds`, ...). A scripted sequence is consumed one entry
//! per call and its last entry repeats.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProcessError;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};

/// How a command was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Output,
    Detached,
    Forwarded,
    Run,
}

/// A recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: InvocationKind,
    pub spec: CommandSpec,
}

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    SpawnError,
}

#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with a successful run printing `stdout`
    pub fn respond(self, command: &str, stdout: &str) -> Self {
        self.push(command, Response::Output(CommandOutput::ok(stdout)))
    }

    /// Answer successive calls of `command` with these stdouts
    pub fn respond_seq(mut self, command: &str, stdouts: &[&str]) -> Self {
        for stdout in stdouts {
            self = self.respond(command, stdout);
        }
        self
    }

    /// Answer `command` with an exit code and no output
    pub fn exit(self, command: &str, code: i32) -> Self {
        self.push(
            command,
            Response::Output(CommandOutput {
                code: Some(code),
                ..Default::default()
            }),
        )
    }

    /// Make `command` fail to spawn
    pub fn spawn_error(self, command: &str) -> Self {
        self.push(command, Response::SpawnError)
    }

    fn push(self, command: &str, response: Response) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines started with the given kind
    pub fn commands(&self, kind: InvocationKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.spec.to_string())
            .collect()
    }

    /// Number of times `command` was run, in any way
    pub fn count(&self, command: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.spec.to_string() == command)
            .count()
    }

    fn record(&self, kind: InvocationKind, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        self.calls.lock().unwrap().push(Invocation {
            kind,
            spec: spec.clone(),
        });

        let key = spec.to_string();
        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match response {
            Some(Response::Output(output)) => Ok(output),
            Some(Response::SpawnError) => Err(ProcessError::Spawn {
                program: spec.program_name(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted spawn failure"),
            }),
            // Unscripted commands succeed silently
            None => Ok(CommandOutput::ok("")),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        self.record(InvocationKind::Output, spec)
    }

    async fn spawn_detached(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        self.record(InvocationKind::Detached, spec).map(|_| ())
    }

    async fn spawn_forwarded(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        self.record(InvocationKind::Forwarded, spec).map(|_| ())
    }

    async fn run_forwarded(&self, spec: &CommandSpec) -> Result<Option<i32>, ProcessError> {
        self.record(InvocationKind::Run, spec).map(|o| o.code)
    }
}
