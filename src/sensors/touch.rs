//! Pointer tracking for touch frames.

use std::time::{Duration, Instant};

use crate::codec::TouchEvent;
use crate::core::constants::TAP_COUNT_WINDOW;

/// State of one active pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    id: i32,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    pressure: f32,
    size: f32,
    tool_type: i32,
}

impl Touch {
    /// Pointer went down at `(x, y)`.
    pub fn new(id: i32, x: f32, y: f32, tool_type: i32) -> Self {
        Self {
            id,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            pressure: 0.0,
            size: 0.0,
            tool_type,
        }
    }

    /// Move the pointer; the delta is relative to the previous position.
    pub fn update(&mut self, x: f32, y: f32, pressure: f32, size: f32) {
        self.dx = x - self.x;
        self.dy = y - self.y;
        self.x = x;
        self.y = y;
        self.pressure = pressure;
        self.size = size;
    }

    /// Pointer id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Snapshot for a touch frame.
    pub fn event(&self) -> TouchEvent {
        TouchEvent {
            id: self.id,
            x: self.x,
            y: self.y,
            size: self.size,
            pressure: self.pressure,
            dx: self.dx,
            dy: self.dy,
            tool_type: self.tool_type,
        }
    }
}

/// Counts taps in a burst; the count resets after a quiet window.
#[derive(Debug, Clone)]
pub struct TapCounter {
    window: Duration,
    count: i32,
    last_tap: Option<Instant>,
}

impl Default for TapCounter {
    fn default() -> Self {
        Self::new(TAP_COUNT_WINDOW)
    }
}

impl TapCounter {
    /// Counter with a custom reset window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            count: 0,
            last_tap: None,
        }
    }

    /// Register a tap at `now` and return the burst count including it.
    pub fn on_tap(&mut self, now: Instant) -> i32 {
        let expired = self
            .last_tap
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
        if expired {
            self.count = 0;
        }
        self.count += 1;
        self.last_tap = Some(now);
        self.count
    }

    /// Count as seen at `now`, zero if the window has passed.
    pub fn count_at(&self, now: Instant) -> i32 {
        match self.last_tap {
            Some(last) if now.saturating_duration_since(last) < self.window => self.count,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_computes_delta() {
        let mut touch = Touch::new(0, 100.0, 200.0, 1);
        touch.update(110.0, 195.0, 0.6, 0.1);
        let event = touch.event();
        assert_eq!(event.dx, 10.0);
        assert_eq!(event.dy, -5.0);
        assert_eq!(event.x, 110.0);
        assert_eq!(event.pressure, 0.6);
        assert_eq!(event.tool_type, 1);

        touch.update(110.0, 195.0, 0.6, 0.1);
        assert_eq!(touch.event().dx, 0.0);
    }

    #[test]
    fn test_new_touch_has_no_delta() {
        let event = Touch::new(2, 5.0, 6.0, 1).event();
        assert_eq!((event.id, event.dx, event.dy), (2, 0.0, 0.0));
    }

    #[test]
    fn test_tap_counter_bursts() {
        let start = Instant::now();
        let mut counter = TapCounter::default();
        assert_eq!(counter.on_tap(start), 1);
        assert_eq!(counter.on_tap(start + Duration::from_millis(200)), 2);
        assert_eq!(counter.on_tap(start + Duration::from_millis(400)), 3);
        assert_eq!(counter.count_at(start + Duration::from_millis(500)), 3);
        assert_eq!(counter.count_at(start + Duration::from_millis(901)), 0);
        assert_eq!(counter.on_tap(start + Duration::from_millis(1000)), 1);
    }
}
