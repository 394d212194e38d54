//! Message kind tags.

use std::fmt;
use std::str::FromStr;

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device to headset host (telemetry).
    DeviceToHost,
    /// Headset host to device (control).
    HostToDevice,
}

/// Tag identifying a frame's schema.
///
/// The wire name is the first field of every frame. Each kind has a fixed,
/// ordered field list; see [`MessageKind::field_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Pointer went down.
    TouchDown,
    /// Pointer went up.
    TouchUp,
    /// Pointer moved (rate limited).
    TouchMove,
    /// Single tap.
    Tap,
    /// Single tap confirmed (not the first half of a double tap).
    TapConfirmed,
    /// Double tap.
    DoubleTap,
    /// Long press.
    LongPress,
    /// Fling gesture.
    Fling,
    /// Pinch began.
    PinchStart,
    /// Pinch span changed.
    PinchMove,
    /// Pinch ended.
    PinchEnd,
    /// Accelerometer (m/s^2).
    Accelerometer,
    /// Gravity vector (m/s^2).
    Gravity,
    /// Gyroscope (rad/s).
    Gyroscope,
    /// Linear acceleration (m/s^2).
    LinearAcceleration,
    /// Rotation vector quaternion.
    RotationVector,
    /// Game rotation vector quaternion (no magnetometer).
    GameRotationVector,
    /// Magnetic field (uT).
    MagneticField,
    /// Proximity (cm).
    Proximity,
    /// Ambient temperature (C).
    AmbientTemperature,
    /// Ambient light (lx).
    Light,
    /// Coarse orientation label.
    DeviceOrientation,
    /// AR camera pose.
    ArPose,
    /// Device description.
    DeviceInfo,
    /// Host liveness ping.
    Heartbeat,
    /// Host asks the device to identify itself.
    WhoAreYou,
    /// Host requests a click haptic.
    HapticsClick,
    /// Host requests a double click haptic.
    HapticsDoubleClick,
    /// Host requests a heavy click haptic.
    HapticsHeavyClick,
    /// Host requests a tick haptic.
    HapticsTick,
    /// Host requests a one-shot vibration.
    HapticsOneShot,
}

impl MessageKind {
    /// All kinds, in declaration order.
    pub const ALL: [MessageKind; 31] = [
        Self::TouchDown,
        Self::TouchUp,
        Self::TouchMove,
        Self::Tap,
        Self::TapConfirmed,
        Self::DoubleTap,
        Self::LongPress,
        Self::Fling,
        Self::PinchStart,
        Self::PinchMove,
        Self::PinchEnd,
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
        Self::DeviceOrientation,
        Self::ArPose,
        Self::DeviceInfo,
        Self::Heartbeat,
        Self::WhoAreYou,
        Self::HapticsClick,
        Self::HapticsDoubleClick,
        Self::HapticsHeavyClick,
        Self::HapticsTick,
        Self::HapticsOneShot,
    ];

    /// Wire name of this kind.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::TouchDown => "TOUCH_DOWN",
            Self::TouchUp => "TOUCH_UP",
            Self::TouchMove => "TOUCH_MOVE",
            Self::Tap => "TAP",
            Self::TapConfirmed => "TAPCONFIRMED",
            Self::DoubleTap => "DOUBLETAP",
            Self::LongPress => "LONGPRESS",
            Self::Fling => "FLING",
            Self::PinchStart => "PINCH_START",
            Self::PinchMove => "PINCH_MOVE",
            Self::PinchEnd => "PINCH_END",
            Self::Accelerometer => "ACCELEROMETER",
            Self::Gravity => "GRAVITY",
            Self::Gyroscope => "GYROSCOPE",
            Self::LinearAcceleration => "LINEAR_ACCELERATION",
            Self::RotationVector => "ROTATION_VECTOR",
            Self::GameRotationVector => "GAME_ROTATION_VECTOR",
            Self::MagneticField => "MAGNETIC_FIELD",
            Self::Proximity => "PROXIMITY",
            Self::AmbientTemperature => "AMBIENT_TEMPERATURE",
            Self::Light => "LIGHT",
            Self::DeviceOrientation => "DEVICE_ORIENTATION",
            Self::ArPose => "ARPOSE",
            Self::DeviceInfo => "DEVICE_INFO",
            Self::Heartbeat => "HEARTBEAT",
            Self::WhoAreYou => "WHOAREYOU",
            Self::HapticsClick => "HAPTICS_CLICK",
            Self::HapticsDoubleClick => "HAPTICS_DOUBLE_CLICK",
            Self::HapticsHeavyClick => "HAPTICS_HEAVY_CLICK",
            Self::HapticsTick => "HAPTICS_TICK",
            Self::HapticsOneShot => "HAPTICS_ONESHOT",
        }
    }

    /// Parse a wire name. Matching is exact (case-sensitive).
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }

    /// Number of fields following the kind tag.
    ///
    /// `DEVICE_ORIENTATION` declares one field but may omit it.
    pub fn field_count(self) -> usize {
        match self {
            Self::TouchDown | Self::TouchUp | Self::TouchMove => 8,
            Self::Tap | Self::TapConfirmed | Self::DoubleTap => 2,
            Self::LongPress => 1,
            Self::Fling => 2,
            Self::PinchStart | Self::PinchMove | Self::PinchEnd => 1,
            Self::Accelerometer
            | Self::Gravity
            | Self::Gyroscope
            | Self::LinearAcceleration
            | Self::MagneticField => 3,
            Self::RotationVector | Self::GameRotationVector => 4,
            Self::Proximity | Self::AmbientTemperature | Self::Light => 1,
            Self::DeviceOrientation => 1,
            Self::ArPose => 7,
            Self::DeviceInfo => 5,
            Self::HapticsOneShot => 2,
            Self::Heartbeat
            | Self::WhoAreYou
            | Self::HapticsClick
            | Self::HapticsDoubleClick
            | Self::HapticsHeavyClick
            | Self::HapticsTick => 0,
        }
    }

    /// Direction this kind travels in.
    pub fn direction(self) -> Direction {
        match self {
            Self::Heartbeat
            | Self::WhoAreYou
            | Self::HapticsClick
            | Self::HapticsDoubleClick
            | Self::HapticsHeavyClick
            | Self::HapticsTick
            | Self::HapticsOneShot => Direction::HostToDevice,
            _ => Direction::DeviceToHost,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for MessageKind {
    type Err = crate::core::MalformedFrame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s)
            .ok_or_else(|| crate::core::MalformedFrame::UnknownKind(s.to_string()))
    }
}
