//! # XDTK Link
//!
//! Device side of the XR Device ToolKit telemetry link: streams sensor,
//! touch and pose events from a phone or wearable to a head-mounted-display
//! host over UDP, and answers the host's small control channel.
//!
//! - **Latency over reliability**: one datagram per event, no acks, no
//!   retransmission; a lost sample is superseded milliseconds later
//! - **Text framing**: one comma-separated line per message,
//!   `<unixMs>,<KIND>,<fields...>` outbound and `<KIND>,<fields...>` inbound
//! - **Passive liveness**: the host sends `HEARTBEAT`; the device reports
//!   connected while one arrived within the window
//!
//! ## Feature Flags
//!
//! - `transport` (default): datagram socket and duplex sender/receiver loops
//! - `session` (default): session controller, rate limits, liveness, ticker
//! - `config` (default): TOML loading and `XDTK_*` environment overrides
//! - `cli`: the `xdtk-sim` simulator binary
//!
//! ## Modules
//!
//! - [`core`]: constants, error types and collaborator traits (always included)
//! - [`codec`]: message kinds, frames and typed payloads (always included)
//! - [`sensors`]: sample store, orientation, touch tracking (always included)
//! - [`transport`]: UDP transport (requires `transport` feature)
//! - [`session`]: session controller (requires `session` feature)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xdtk_link::prelude::*;
//!
//! # async fn run() -> Result<(), XdtkError> {
//! let device = Arc::new(DeviceProfile {
//!     manufacturer: "google".into(),
//!     model: "Pixel 8".into(),
//!     width_px: 1080.0,
//!     height_px: 2400.0,
//!     xdpi: 432.0,
//!     ydpi: 480.0,
//! });
//! let session = Arc::new(SessionController::new(SessionConfig::default(), device));
//! session.open_connection("192.168.1.20").await?;
//!
//! let samples = Arc::new(LatestSamples::new());
//! samples.record(SensorKind::Accelerometer, SensorSample::new([0.1, 9.8, 0.2]));
//! let ticker = spawn_sensor_ticker(Arc::clone(&session), samples, session.config().tick_interval);
//!
//! session.send_tap(Tap { pointer_id: 0, tap_count: 1 });
//! println!("connected: {}", session.is_connected());
//!
//! ticker.abort();
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Frame codec (always included)
pub mod codec;

// Event producers (always included)
pub mod sensors;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Session layer (feature-gated)
#[cfg(feature = "session")]
#[cfg_attr(docsrs, doc(cfg(feature = "session")))]
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core traits and types
    pub use crate::core::*;

    pub use crate::codec::{
        DeviceInfo, DeviceOrientation, Direction, HapticEffect, InboundFrame, Message,
        MessageKind, OutboundFrame, Pose, Quat, Tap, TouchEvent, Vec3,
    };

    pub use crate::sensors::{
        DeviceProfile, LatestSamples, SensorKind, SensorSample, TapCounter, Touch,
    };

    #[cfg(feature = "transport")]
    pub use crate::transport::{
        DatagramSocket, DuplexTransport, Endpoint, FrameSender, InboundHandler,
        TransportOptions, TransportStats,
    };

    #[cfg(feature = "session")]
    pub use crate::session::{
        LivenessState, LivenessTracker, RateLimitGate, SessionConfig, SessionConfigBuilder,
        SessionController, spawn_sensor_ticker,
    };
}

// Re-export commonly used items at crate root
pub use codec::{Message, MessageKind, decode, encode};
pub use crate::core::{MalformedFrame, TransportError, XdtkError};

#[cfg(feature = "transport")]
pub use transport::DuplexTransport;

#[cfg(feature = "session")]
pub use session::{SessionConfig, SessionController};
