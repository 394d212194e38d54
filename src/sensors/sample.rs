//! Sensor kinds and the latest-sample store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use crate::codec::{DeviceOrientation, Message, MessageKind, Quat, Vec3};
use crate::core::SampleSource;

use super::orientation::orientation_from_gravity;

/// Sensors streamed on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Accelerometer, 3 values.
    Accelerometer,
    /// Gravity, 3 values.
    Gravity,
    /// Gyroscope, 3 values.
    Gyroscope,
    /// Linear acceleration, 3 values.
    LinearAcceleration,
    /// Rotation vector, 4 values.
    RotationVector,
    /// Game rotation vector, 4 values.
    GameRotationVector,
    /// Magnetic field, 3 values.
    MagneticField,
    /// Proximity, 1 value.
    Proximity,
    /// Ambient temperature, 1 value.
    AmbientTemperature,
    /// Light, 1 value.
    Light,
}

impl SensorKind {
    /// Order in which a tick flushes sensors.
    pub const FLUSH_ORDER: [SensorKind; 10] = [
        Self::Accelerometer,
        Self::Gravity,
        Self::Gyroscope,
        Self::LinearAcceleration,
        Self::RotationVector,
        Self::GameRotationVector,
        Self::MagneticField,
        Self::Proximity,
        Self::AmbientTemperature,
        Self::Light,
    ];

    /// Minimum number of values a sample must carry.
    pub fn arity(self) -> usize {
        self.message_kind().field_count()
    }

    /// Message kind this sensor is reported as.
    pub fn message_kind(self) -> MessageKind {
        match self {
            Self::Accelerometer => MessageKind::Accelerometer,
            Self::Gravity => MessageKind::Gravity,
            Self::Gyroscope => MessageKind::Gyroscope,
            Self::LinearAcceleration => MessageKind::LinearAcceleration,
            Self::RotationVector => MessageKind::RotationVector,
            Self::GameRotationVector => MessageKind::GameRotationVector,
            Self::MagneticField => MessageKind::MagneticField,
            Self::Proximity => MessageKind::Proximity,
            Self::AmbientTemperature => MessageKind::AmbientTemperature,
            Self::Light => MessageKind::Light,
        }
    }

    /// Build the message for `sample`, or `None` if it is too short.
    pub fn to_message(self, sample: &SensorSample) -> Option<Message> {
        let v = sample.values();
        if v.len() < self.arity() {
            return None;
        }
        let vec3 = || Vec3::new(v[0], v[1], v[2]);
        let quat = || Quat::new(v[0], v[1], v[2], v[3]);
        let message = match self {
            Self::Accelerometer => Message::Accelerometer(vec3()),
            Self::Gravity => Message::Gravity(vec3()),
            Self::Gyroscope => Message::Gyroscope(vec3()),
            Self::LinearAcceleration => Message::LinearAcceleration(vec3()),
            Self::RotationVector => Message::RotationVector(quat()),
            Self::GameRotationVector => Message::GameRotationVector(quat()),
            Self::MagneticField => Message::MagneticField(vec3()),
            Self::Proximity => Message::Proximity(v[0]),
            Self::AmbientTemperature => Message::AmbientTemperature(v[0]),
            Self::Light => Message::Light(v[0]),
        };
        Some(message)
    }
}

/// One sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    values: Vec<f32>,
    captured_at: Instant,
}

impl SensorSample {
    /// Reading captured now.
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self::at(values, Instant::now())
    }

    /// Reading captured at `captured_at`.
    pub fn at(values: impl Into<Vec<f32>>, captured_at: Instant) -> Self {
        Self {
            values: values.into(),
            captured_at,
        }
    }

    /// Raw values as reported by the sensor.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// When the reading was taken.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

#[derive(Debug, Default)]
struct Inner {
    samples: HashMap<SensorKind, SensorSample>,
    orientation: Option<DeviceOrientation>,
}

/// Thread-safe store of the latest reading per sensor.
///
/// Sensor callbacks [`record`](Self::record) into it; the tick reads it
/// through [`SampleSource`]. Gravity readings also update the derived
/// device orientation.
#[derive(Debug, Default)]
pub struct LatestSamples {
    inner: RwLock<Inner>,
}

impl LatestSamples {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest reading for `sensor`.
    pub fn record(&self, sensor: SensorKind, sample: SensorSample) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if sensor == SensorKind::Gravity && sample.values().len() >= 3 {
            let v = sample.values();
            if let Some(orientation) = orientation_from_gravity(Vec3::new(v[0], v[1], v[2])) {
                inner.orientation = Some(orientation);
            }
        }
        inner.samples.insert(sensor, sample);
    }

    /// Forget every reading (sensors paused or unregistered).
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.samples.clear();
        inner.orientation = None;
    }
}

impl SampleSource for LatestSamples {
    fn latest(&self, sensor: SensorKind) -> Option<SensorSample> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.samples.get(&sensor).cloned()
    }

    fn device_orientation(&self) -> Option<DeviceOrientation> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orientation
    }
}
