//! Minimum-interval gate for high-frequency message classes.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Admits at most one send per `min_interval`.
///
/// Calls inside the window are rejected, not deferred. Check and update
/// happen under one lock, so concurrent producers cannot both pass.
#[derive(Debug)]
pub struct RateLimitGate {
    min_interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl RateLimitGate {
    /// Create a gate with the given floor.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: Mutex::new(None),
        }
    }

    /// The rate-limit floor.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Try to pass the gate now.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Try to pass the gate at `now`. A call exactly one floor after the
    /// previous accepted call passes.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        self.try_send_at(now, || true)
    }

    /// Pass the gate now and run `send`. See [`try_send_at`](Self::try_send_at).
    pub fn try_send(&self, send: impl FnOnce() -> bool) -> bool {
        self.try_send_at(Instant::now(), send)
    }

    /// Pass the gate at `now` and run `send` under the gate lock.
    ///
    /// The window only advances when `send` returns `true`; a failed send
    /// leaves the gate as it was. Returns `false` when gated or when `send`
    /// failed.
    pub fn try_send_at(&self, now: Instant, send: impl FnOnce() -> bool) -> bool {
        let mut last = self.last_sent.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*last, Some(prev) if now.saturating_duration_since(prev) < self.min_interval)
            || !send()
        {
            return false;
        }
        *last = Some(now);
        true
    }

    /// Forget the last accepted send.
    pub fn reset(&self) {
        *self.last_sent.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
