//! Error types shared by the rn-droid crates
//!
//! Process execution and readiness polling failures, using thiserror.

use std::time::Duration;
use thiserror::Error;

/// Failure to run an external command
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

/// Failure of a readiness poll
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("{condition} not reached after {waited:?}")]
    TimedOut {
        condition: String,
        waited: Duration,
        /// Reason given by the last inconclusive probe, if any
        last_inconclusive: Option<String>,
    },
}

impl PollError {
    /// How long the poll ran before giving up
    pub fn waited(&self) -> Duration {
        match self {
            PollError::TimedOut { waited, .. } => *waited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_mentions_exit_code() {
        let err = ProcessError::Failed {
            program: "adb".into(),
            code: Some(1),
            stderr: "error: no devices/emulators found".into(),
        };
        assert_eq!(
            err.to_string(),
            "`adb` exited with code 1: error: no devices/emulators found"
        );

        let killed = ProcessError::Failed {
            program: "adb".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("a signal"));
    }
}
