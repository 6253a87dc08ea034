//! Readiness polling
//!
//! Repeats a probe on a fixed interval until it reports [`Probe::Ready`] or
//! the session's timeout elapses. Used for both the attach wait and the boot
//! wait of a freshly launched emulator.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, trace};

use crate::error::PollError;

/// Point-in-time result of a readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The condition holds
    Ready,
    /// The check ran and the condition does not hold yet
    Pending,
    /// The check itself could not run (for example adb not responding yet).
    /// Treated as not ready.
    Inconclusive(String),
}

impl Probe {
    pub fn is_ready(&self) -> bool {
        matches!(self, Probe::Ready)
    }
}

impl From<bool> for Probe {
    fn from(ready: bool) -> Self {
        if ready {
            Probe::Ready
        } else {
            Probe::Pending
        }
    }
}

/// Tick interval and optional deadline of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until ready
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    pub fn bounded(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout: Some(timeout),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }
}

/// Summary of a successful poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Number of probe invocations, including the successful one
    pub attempts: u32,
    pub elapsed: Duration,
}

/// State of one in-flight poll
struct PollSession {
    started: Instant,
    policy: PollPolicy,
    attempts: u32,
    last_inconclusive: Option<String>,
}

impl PollSession {
    fn start(policy: PollPolicy) -> Self {
        Self {
            started: Instant::now(),
            policy,
            attempts: 0,
            last_inconclusive: None,
        }
    }

    fn expired(&self) -> bool {
        self.policy
            .timeout
            .map_or(false, |timeout| self.started.elapsed() >= timeout)
    }

    /// Time left before the deadline, `None` when unbounded
    fn remaining(&self) -> Option<Duration> {
        self.policy
            .timeout
            .map(|timeout| timeout.saturating_sub(self.started.elapsed()))
    }

    fn outcome(&self) -> PollOutcome {
        PollOutcome {
            attempts: self.attempts,
            elapsed: self.started.elapsed(),
        }
    }

    fn timed_out(self, condition: &str) -> PollError {
        PollError::TimedOut {
            condition: condition.to_string(),
            waited: self.started.elapsed(),
            last_inconclusive: self.last_inconclusive,
        }
    }
}

/// Invoke `probe` every `policy.interval` until it returns [`Probe::Ready`].
///
/// The probe is not called again once it has reported ready. With a timeout,
/// the poll fails on the first tick where the elapsed time has reached it,
/// and a probe still running at the deadline is cancelled.
pub async fn poll_until<F, Fut>(
    condition: &str,
    policy: PollPolicy,
    mut probe: F,
) -> Result<PollOutcome, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Probe>,
{
    let mut session = PollSession::start(policy);
    debug!(condition, ?policy, "polling");

    loop {
        session.attempts += 1;

        let result = match session.remaining() {
            Some(remaining) => timeout(remaining, probe())
                .await
                .unwrap_or_else(|_| Probe::Inconclusive("probe did not finish before the deadline".into())),
            None => probe().await,
        };

        match result {
            Probe::Ready => {
                let outcome = session.outcome();
                debug!(condition, attempts = outcome.attempts, elapsed = ?outcome.elapsed, "ready");
                return Ok(outcome);
            }
            Probe::Pending => {
                trace!(condition, attempt = session.attempts, "not ready");
            }
            Probe::Inconclusive(reason) => {
                debug!(condition, attempt = session.attempts, %reason, "probe inconclusive");
                session.last_inconclusive = Some(reason);
            }
        }

        if session.expired() {
            return Err(session.timed_out(condition));
        }

        sleep(session.policy.interval).await;
    }
}
