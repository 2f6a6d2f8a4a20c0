//! Process-wide spacing of outbound AI provider calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

/// Guarantees at least `min_interval` between two successive `acquire()` returns.
///
/// Construct once per process and share through `Arc`. Waiters are served in
/// the order they get the lock, which is not guaranteed to be arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the interval since the previous acquisition has passed,
    /// then records the new acquisition time.
    pub async fn acquire(&self) {
        // Held across the sleep so the check and the update are one step.
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready = prev + self.min_interval;
            let now = Instant::now();
            if now < ready {
                debug!(wait_ms = (ready - now).as_millis() as u64, "rate limiter waiting");
                sleep_until(ready).await;
            }
        }
        *last = Some(Instant::now());
    }
}
