//! Static description of the local device.

use crate::codec::DeviceInfo;
use crate::core::DeviceInfoSource;
use crate::core::constants::FIELD_DELIMITER;

/// Display and identity of the device, as reported in `DEVICE_INFO`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Manufacturer, e.g. "google".
    pub manufacturer: String,
    /// Model, e.g. "Pixel 8".
    pub model: String,
    /// Physical display width in pixels.
    pub width_px: f32,
    /// Physical display height in pixels.
    pub height_px: f32,
    /// Horizontal pixel density.
    pub xdpi: f32,
    /// Vertical pixel density.
    pub ydpi: f32,
}

impl DeviceProfile {
    /// Display name: capitalised manufacturer followed by the model.
    ///
    /// Delimiter characters are replaced so the name stays one field.
    pub fn display_name(&self) -> String {
        let mut chars = self.manufacturer.chars();
        let manufacturer: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        let name = format!("{manufacturer} {}", self.model);
        name.trim().replace(FIELD_DELIMITER, " ")
    }

    fn inches(px: f32, dpi: f32) -> f32 {
        if dpi > 0.0 { px / dpi } else { 0.0 }
    }
}

impl DeviceInfoSource for DeviceProfile {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.display_name(),
            width_px: self.width_px,
            height_px: self.height_px,
            width_in: Self::inches(self.width_px, self.xdpi),
            height_in: Self::inches(self.height_px, self.ydpi),
        }
    }
}
