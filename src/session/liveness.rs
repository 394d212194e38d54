//! Heartbeat-driven connection liveness.
//!
//! Passive: the host sends `HEARTBEAT`, the device never pings. The peer is
//! connected while the last heartbeat is within the timeout window; expiry
//! is evaluated on read, so no timer task is needed.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::info;

/// Liveness of the headset host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LivenessState {
    /// No heartbeat within the window (initial state).
    Disconnected,
    /// Heartbeat seen within the window.
    Connected,
}

impl fmt::Display for LivenessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Sliding-window liveness state machine.
///
/// Mutated by the receiver task, read from any thread.
#[derive(Debug)]
pub struct LivenessTracker {
    timeout: Duration,
    last_heartbeat: Mutex<Option<Instant>>,
}

impl LivenessTracker {
    /// Create a tracker in the `Disconnected` state.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_heartbeat: Mutex::new(None),
        }
    }

    /// The liveness window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Record a heartbeat received now.
    pub fn on_heartbeat(&self) {
        self.on_heartbeat_at(Instant::now());
    }

    /// Record a heartbeat received at `now`, re-arming the window.
    pub fn on_heartbeat_at(&self, now: Instant) {
        let mut last = self.lock();
        let was_connected = last.is_some_and(|t| self.within_window(t, now));
        *last = Some(now);
        if !was_connected {
            info!("host connected");
        }
    }

    /// Force `Disconnected` (e.g. on close).
    pub fn disarm(&self) {
        *self.lock() = None;
    }

    /// Whether a heartbeat arrived within the window of now.
    pub fn is_connected(&self) -> bool {
        self.is_connected_at(Instant::now())
    }

    /// Whether a heartbeat arrived within the window of `now`.
    pub fn is_connected_at(&self, now: Instant) -> bool {
        self.lock().is_some_and(|t| self.within_window(t, now))
    }

    /// Current state.
    pub fn state(&self) -> LivenessState {
        self.state_at(Instant::now())
    }

    /// State at `now`.
    pub fn state_at(&self, now: Instant) -> LivenessState {
        if self.is_connected_at(now) {
            LivenessState::Connected
        } else {
            LivenessState::Disconnected
        }
    }

    /// When the last heartbeat arrived, if any since the last disarm.
    pub fn last_heartbeat(&self) -> Option<Instant> {
        *self.lock()
    }

    fn within_window(&self, heartbeat: Instant, now: Instant) -> bool {
        now.saturating_duration_since(heartbeat) <= self.timeout
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
