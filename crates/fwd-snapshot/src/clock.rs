//! Injectable time source for the poll loop.

use std::time::Duration;

/// Time and sleep, behind a seam so tests can simulate elapsed time.
pub trait Clock: Send + Sync {
    /// Current time, epoch milliseconds UTC.
    fn now_ms(&self) -> i64;

    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
