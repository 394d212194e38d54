//! Coarse device orientation from the gravity vector.

use crate::codec::{DeviceOrientation, Vec3};
use crate::core::constants::ORIENTATION_THRESHOLD;

/// Classify a gravity reading.
///
/// The vector is normalised, then axes are tested in a fixed priority:
/// z (face up/down), x (landscape), y (portrait). Returns `None` when no
/// axis dominates or the vector is zero.
pub fn orientation_from_gravity(gravity: Vec3) -> Option<DeviceOrientation> {
    let norm = gravity.norm();
    if !norm.is_normal() {
        return None;
    }
    let (x, y, z) = (gravity.x / norm, gravity.y / norm, gravity.z / norm);

    if z > ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::FaceUp)
    } else if z < -ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::FaceDown)
    } else if x > ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::LandscapeLeft)
    } else if x < -ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::LandscapeRight)
    } else if y > ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::Portrait)
    } else if y < -ORIENTATION_THRESHOLD {
        Some(DeviceOrientation::PortraitUpsideDown)
    } else {
        None
    }
}
