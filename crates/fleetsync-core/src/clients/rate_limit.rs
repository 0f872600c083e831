//! Minimum-spacing rate limiter.

use std::time::{Duration, Instant};

/// Enforces a minimum spacing between calls by blocking the calling
/// thread for the remainder of the interval. Process-local, one limiter
/// per client; there is no cluster-wide coordination.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Block until the minimum spacing from the previous call has
    /// elapsed, then mark the current call.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}
