//! Session layer.
//!
//! - [`SessionConfig`]: ports, intervals and buffer sizes
//! - [`RateLimitGate`]: minimum interval between sends of one class
//! - [`LivenessTracker`]: heartbeat-driven connected/disconnected state
//! - [`SessionController`]: open/close, `send_*` family, inbound dispatch
//! - [`spawn_sensor_ticker`]: periodic sensor flush

mod config;
mod controller;
mod liveness;
mod rate_limit;
mod ticker;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use controller::SessionController;
pub use liveness::{LivenessState, LivenessTracker};
pub use rate_limit::RateLimitGate;
pub use ticker::spawn_sensor_ticker;
