//! Device-side producers: sensor samples, touch tracking, device profile.
//!
//! These are the data sources the session controller streams. They do no
//! I/O and are usable without the `transport` feature.

mod device;
mod orientation;
mod sample;
mod touch;

pub use device::DeviceProfile;
pub use orientation::orientation_from_gravity;
pub use sample::{LatestSamples, SensorKind, SensorSample};
pub use touch::{TapCounter, Touch};
