use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Time source injected into the poller so that deadlines and inter-tick
/// pauses never touch the wall clock directly. Deterministic tests swap in
/// [`ManualClock`]; production code uses [`TokioClock`].
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic reading relative to the clock's epoch.
    fn now(&self) -> Duration;

    /// Block the current logical thread of control for `interval`.
    async fn pause(&self, interval: Duration);
}

/// Real clock backed by `Instant` and the tokio timer.
pub struct TokioClock {
    epoch: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    async fn pause(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Hand-cranked clock: `pause` advances the reading instead of sleeping and
/// records the requested interval, so poller tests can assert exact tick
/// counts without waiting for real time.
#[derive(Default)]
pub struct ManualClock {
    reading: Mutex<Duration>,
    pauses: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intervals passed to `pause` so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }

    /// Move the reading forward without registering a pause.
    pub fn advance(&self, by: Duration) {
        *self.reading.lock().unwrap() += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.reading.lock().unwrap()
    }

    async fn pause(&self, interval: Duration) {
        *self.reading.lock().unwrap() += interval;
        self.pauses.lock().unwrap().push(interval);
    }
}
