//! Protocol constants for the XDTK telemetry link.
//!
//! Ports and wire tokens are shared with the headset host and MUST NOT be
//! changed. Timing values are defaults; see `SessionConfig` to override them.

use std::time::Duration;

// =============================================================================
// PORTS
// =============================================================================

/// Host port that receives device telemetry.
pub const DEFAULT_SEND_PORT: u16 = 5555;

/// Local port the host sends control messages to.
pub const DEFAULT_RECEIVE_PORT: u16 = 5556;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Field delimiter. Field values never contain it.
pub const FIELD_DELIMITER: char = ',';

/// Default receive buffer size for inbound control datagrams.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024;

// =============================================================================
// TIMING
// =============================================================================

/// Peer is considered disconnected this long after the last heartbeat.
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Minimum interval between two TOUCH_MOVE frames.
pub const TOUCH_MOVE_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum interval between two DEVICE_INFO frames.
pub const DEVICE_INFO_INTERVAL: Duration = Duration::from_millis(20);

/// Sensor flush cadence on phones.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Sensor flush cadence on watches (reduced link rate).
pub const WEARABLE_TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Taps further apart than this start a new tap count.
pub const TAP_COUNT_WINDOW: Duration = Duration::from_millis(500);

// =============================================================================
// SENSORS
// =============================================================================

/// Normalised gravity component above which an axis is considered "down".
pub const ORIENTATION_THRESHOLD: f32 = 0.8;
