//! Request pacing for the citation count service.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Spaces requests at least `1 / max_per_second` apart.
///
/// Also honours a server-requested pause (from a `Retry-After` header), during
/// which no request is let through.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

#[derive(Debug)]
struct RateLimiterInner {
    /// Minimum spacing between two requests.
    min_interval: Duration,
    /// Send time of the most recently reserved request.
    last_request: Option<Instant>,
    /// No request before this instant.
    paused_until: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_second` requests per second.
    /// A non-positive rate disables local pacing.
    pub fn new(max_per_second: f64) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                min_interval,
                last_request: None,
                paused_until: None,
            })),
        }
    }

    /// Wait until a request is allowed.
    ///
    /// Each caller reserves its own send slot while holding the lock, so
    /// concurrent callers are released one interval apart rather than
    /// together. A pause requested after a slot was reserved pushes that
    /// caller back again.
    pub async fn acquire(&self) {
        loop {
            let slot = {
                let mut inner = self.inner.lock().await;
                let mut slot = Instant::now();
                if let Some(until) = inner.paused_until {
                    slot = slot.max(until);
                }
                if let Some(last) = inner.last_request {
                    slot = slot.max(last + inner.min_interval);
                }
                inner.last_request = Some(slot);
                slot
            };

            tokio::time::sleep_until(slot).await;

            let inner = self.inner.lock().await;
            if inner.paused_until.map_or(true, |until| until <= Instant::now()) {
                return;
            }
        }
    }

    /// Hold back every request for `wait`, as asked by the server.
    pub async fn pause(&self, wait: Duration) {
        let mut inner = self.inner.lock().await;
        let until = Instant::now() + wait;
        inner.paused_until = Some(inner.paused_until.map_or(until, |p| p.max(until)));
    }
}
