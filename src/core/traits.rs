//! Collaborator traits.
//!
//! The link core does not talk to sensors, displays or vibration motors
//! directly. The host platform implements these traits and hands them to
//! the session controller.

use crate::codec::{DeviceInfo, DeviceOrientation, HapticEffect};
use crate::sensors::{SensorKind, SensorSample};

/// Pull-based access to the latest sensor readings.
///
/// Called from the sensor tick; implementations must be cheap and must not
/// block for long.
pub trait SampleSource: Send + Sync {
    /// Latest sample for `sensor`, or `None` if the sensor has produced no data.
    fn latest(&self, sensor: SensorKind) -> Option<SensorSample>;

    /// Current coarse device orientation, if one has been derived.
    fn device_orientation(&self) -> Option<DeviceOrientation>;
}

/// Describes the local device for `DEVICE_INFO` replies.
pub trait DeviceInfoSource: Send + Sync {
    /// Build the device description sent to the host.
    fn device_info(&self) -> DeviceInfo;
}

/// Receives haptic requests sent by the host.
///
/// Invoked on the receiver task; implementations should hand the effect off
/// rather than block.
pub trait HapticsHandler: Send + Sync {
    /// Play `effect`.
    fn on_haptic(&self, effect: HapticEffect);
}

impl<T: DeviceInfoSource + ?Sized> DeviceInfoSource for std::sync::Arc<T> {
    fn device_info(&self) -> DeviceInfo {
        (**self).device_info()
    }
}

impl<T: SampleSource + ?Sized> SampleSource for std::sync::Arc<T> {
    fn latest(&self, sensor: SensorKind) -> Option<SensorSample> {
        (**self).latest(sensor)
    }

    fn device_orientation(&self) -> Option<DeviceOrientation> {
        (**self).device_orientation()
    }
}
