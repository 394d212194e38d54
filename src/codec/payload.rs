//! Typed payloads carried by messages.

use std::fmt;
use std::str::FromStr;

/// Three-axis sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// X axis.
    pub x: f32,
    /// Y axis.
    pub y: f32,
    /// Z axis.
    pub z: f32,
}

impl Vec3 {
    /// Create a vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Rotation quaternion in `x, y, z, w` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// Scalar component.
    pub w: f32,
}

impl Quat {
    /// Create a quaternion.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// AR camera pose: translation plus rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Translation in metres.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
}

/// Raw touch state for TOUCH_DOWN / TOUCH_UP / TOUCH_MOVE.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchEvent {
    /// Pointer id.
    pub id: i32,
    /// Raw screen X in pixels.
    pub x: f32,
    /// Raw screen Y in pixels.
    pub y: f32,
    /// Contact size (normalised).
    pub size: f32,
    /// Contact pressure (normalised).
    pub pressure: f32,
    /// X movement since the previous update.
    pub dx: f32,
    /// Y movement since the previous update.
    pub dy: f32,
    /// Platform tool type (finger, stylus, ...).
    pub tool_type: i32,
}

/// Tap gesture payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tap {
    /// Pointer id.
    pub pointer_id: i32,
    /// Taps counted in the current burst.
    pub tap_count: i32,
}

/// Description of the sending device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceInfo {
    /// Human readable name, e.g. "Google Pixel 8".
    pub name: String,
    /// Display width in pixels.
    pub width_px: f32,
    /// Display height in pixels.
    pub height_px: f32,
    /// Display width in inches.
    pub width_in: f32,
    /// Display height in inches.
    pub height_in: f32,
}

/// Coarse orientation derived from gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceOrientation {
    /// Screen facing the sky.
    FaceUp,
    /// Screen facing the ground.
    FaceDown,
    /// Rotated so the left edge points down.
    LandscapeLeft,
    /// Rotated so the right edge points down.
    LandscapeRight,
    /// Upright.
    Portrait,
    /// Upside down.
    PortraitUpsideDown,
}

impl DeviceOrientation {
    /// Wire label.
    pub fn label(self) -> &'static str {
        match self {
            Self::FaceUp => "FACE_UP",
            Self::FaceDown => "FACE_DOWN",
            Self::LandscapeLeft => "LANDSCAPE_LEFT",
            Self::LandscapeRight => "LANDSCAPE_RIGHT",
            Self::Portrait => "PORTRAIT",
            Self::PortraitUpsideDown => "PORTRAIT_UPSIDE_DOWN",
        }
    }
}

impl fmt::Display for DeviceOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceOrientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FACE_UP" => Ok(Self::FaceUp),
            "FACE_DOWN" => Ok(Self::FaceDown),
            "LANDSCAPE_LEFT" => Ok(Self::LandscapeLeft),
            "LANDSCAPE_RIGHT" => Ok(Self::LandscapeRight),
            "PORTRAIT" => Ok(Self::Portrait),
            "PORTRAIT_UPSIDE_DOWN" => Ok(Self::PortraitUpsideDown),
            _ => Err(()),
        }
    }
}

/// Haptic effect requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticEffect {
    /// Short click.
    Click,
    /// Two clicks.
    DoubleClick,
    /// Strong click.
    HeavyClick,
    /// Very light tick.
    Tick,
    /// Vibrate once.
    OneShot {
        /// Duration in milliseconds.
        duration_ms: i64,
        /// Amplitude, 1..=255 (or -1 for the platform default).
        amplitude: i32,
    },
}

/// Format a float so it always carries a decimal point or exponent
/// (`1.0`, `0.25`, `1e-7`) and parses back to the same value.
pub(crate) fn format_float(value: f32) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_keeps_decimal_point() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.1), "0.1");
    }

    #[test]
    fn test_format_float_round_trips() {
        for v in [0.0f32, 9.80665, -0.000_123, 1.0e-7, 12345.678, f32::MAX] {
            assert_eq!(format_float(v).parse::<f32>().unwrap(), v);
        }
    }

    #[test]
    fn test_orientation_labels_parse_back() {
        for o in [
            DeviceOrientation::FaceUp,
            DeviceOrientation::FaceDown,
            DeviceOrientation::LandscapeLeft,
            DeviceOrientation::LandscapeRight,
            DeviceOrientation::Portrait,
            DeviceOrientation::PortraitUpsideDown,
        ] {
            assert_eq!(o.label().parse::<DeviceOrientation>(), Ok(o));
        }
        assert!("UNKNOWN".parse::<DeviceOrientation>().is_err());
    }

    #[test]
    fn test_vec3_norm() {
        assert_eq!(Vec3::new(3.0, 4.0, 0.0).norm(), 5.0);
    }
}
