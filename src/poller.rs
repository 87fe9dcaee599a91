use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::errors::LocateError;

/// Verdict returned by one poll tick.
#[derive(Debug)]
pub enum Probe<T> {
    /// Condition met; polling stops with this value.
    Ready(T),
    /// Condition not met yet, or a benign race with document mutation.
    Retry,
    /// Unrecoverable failure; polling aborts immediately.
    Fatal(LocateError),
}

/// Per-result-type acceptance rule: booleans must be true, sequences
/// non-empty, optional references present.
pub trait Satisfied {
    fn satisfied(&self) -> bool;
}

impl Satisfied for bool {
    fn satisfied(&self) -> bool {
        *self
    }
}

impl<T> Satisfied for Vec<T> {
    fn satisfied(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Satisfied for Option<T> {
    fn satisfied(&self) -> bool {
        self.is_some()
    }
}

/// Time-bounded retry loop.
///
/// Evaluates `tick` at least once. A `Ready` verdict short-circuits before
/// any deadline check, so a zero timeout with an immediately ready tick still
/// succeeds (single-shot semantics). Hitting the deadline yields `Ok(None)`:
/// absence of a satisfying value is not an error at this layer, higher layers
/// decide whether it is one.
pub async fn poll<T, F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut tick: F,
) -> Result<Option<T>, LocateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    let deadline = clock.now() + timeout;
    loop {
        match tick().await {
            Probe::Ready(value) => return Ok(Some(value)),
            Probe::Fatal(err) => return Err(err),
            Probe::Retry => {}
        }
        if clock.now() >= deadline {
            debug!(?timeout, "poll deadline reached");
            return Ok(None);
        }
        clock.pause(interval).await;
    }
}

/// Polls a fallible evaluation until its value satisfies its own acceptance
/// rule. Retryable failures count as "not yet"; anything else aborts.
pub async fn poll_satisfied<T, F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut evaluate: F,
) -> Result<Option<T>, LocateError>
where
    T: Satisfied,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LocateError>>,
{
    poll(clock, timeout, interval, || {
        let attempt = evaluate();
        async move {
            match attempt.await {
                Ok(value) if value.satisfied() => Probe::Ready(value),
                Ok(_) => Probe::Retry,
                Err(err) if err.is_retryable() => {
                    debug!(%err, "retryable failure, polling on");
                    Probe::Retry
                }
                Err(err) => Probe::Fatal(err),
            }
        }
    })
    .await
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;
