//! Circuit breaker for provider rate limiting and key bans.
//!
//! When the API returns HTTP 403 (banned/expired key) or repeated 429s, the
//! breaker trips and refuses all further requests for a cooldown period so we
//! stop hammering the provider.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BreakerInner {
    tripped_at: Option<Instant>,
    consecutive_failures: u32,
}

/// Trip-after-N-failures breaker with a cooldown.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                tripped_at: None,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold,
        }
    }

    /// Default for the market-data API: 15-minute cooldown, trips after 3
    /// consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(15 * 60), 3)
    }

    /// Check if requests are currently allowed. Resets an expired cooldown.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.tripped_at {
            None => true,
            Some(at) if at.elapsed() >= self.cooldown => {
                inner.tripped_at = None;
                inner.consecutive_failures = 0;
                true
            }
            Some(_) => false,
        }
    }

    /// Record a successful request — resets the failure counter.
    pub fn record_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    /// Record a failure; trips the breaker at the threshold.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.tripped_at = Some(Instant::now());
        }
    }

    /// Immediately trip the breaker (for 403 Forbidden).
    pub fn trip(&self) {
        self.inner.lock().unwrap().tripped_at = Some(Instant::now());
    }

    /// Remaining cooldown time (zero if not tripped).
    pub fn remaining_cooldown(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        match inner.tripped_at {
            None => Duration::ZERO,
            Some(at) => self.cooldown.saturating_sub(at.elapsed()),
        }
    }
}
