//! Frame codec.
//!
//! Every message travels as one comma-separated text line. This module owns
//! the kind tags, the line framing and the typed payload schemas:
//!
//! - [`MessageKind`]: exhaustive tag enumeration with wire names
//! - [`OutboundFrame`] / [`InboundFrame`]: raw frames, [`encode`] / [`decode`]
//! - [`Message`]: typed view with per-kind field schemas
//!
//! ```text
//! 1718030000123,ACCELEROMETER,0.12,9.78,0.03      device -> host
//! WHOAREYOU                                       host -> device
//! ```

mod frame;
mod kind;
mod message;
mod payload;

pub use frame::*;
pub use kind::{Direction, MessageKind};
pub use message::Message;
pub use payload::{
    DeviceInfo, DeviceOrientation, HapticEffect, Pose, Quat, Tap, TouchEvent, Vec3,
};
