//! Request Throttle
//!
//! Paces outbound requests to an upstream service so that consecutive
//! requests are at least `min_interval` apart. Public geocoding services
//! ask clients to stay under one request per second.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-spacing throttle for outbound requests.
///
/// The lock is held while a caller waits for its slot, so callers go
/// through in arrival order. A caller dropped while waiting (deadline or
/// cancellation) leaves the queue without consuming a slot.
pub struct Throttle {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// One request per second.
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Return when it is this caller's turn.
    ///
    /// The next slot is only pushed back once the caller has reached its
    /// own slot.
    pub async fn acquire(&self) {
        let mut next = self.next_slot.lock().await;

        let slot = Self::earliest_slot(*next, Instant::now());
        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::debug!("throttling outbound request for {:?}", wait);
            tokio::time::sleep_until(slot).await;
        }

        *next = Some(slot + self.min_interval);
    }

    /// The earliest slot at or after `now`.
    fn earliest_slot(next: Option<Instant>, now: Instant) -> Instant {
        match next {
            Some(n) if n > now => n,
            _ => now,
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::per_second()
    }
}
