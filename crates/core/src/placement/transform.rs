//! Per-zone design transform and its containment rules.

use serde::{Deserialize, Serialize};

use super::geometry::ZoneSize;
use super::{PlacementConfig, DEFAULT_DESIGN_SCALE};

/// Placement of a design inside one delimitation zone.
///
/// `(x, y)` is the pixel offset of the design centre from the zone centre;
/// `(0, 0)` is perfectly centred. The design box is always
/// `design_scale * zone.width` by `design_scale * zone.height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTransform {
    pub x: f64,
    pub y: f64,
    pub design_scale: f64,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
}

impl Default for DesignTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            design_scale: DEFAULT_DESIGN_SCALE,
            rotation: 0.0,
        }
    }
}

impl DesignTransform {
    pub fn with_scale(design_scale: f64) -> Self {
        Self {
            design_scale,
            ..Self::default()
        }
    }

    /// Pixel size of the design box inside `zone`.
    pub fn design_box(&self, zone: ZoneSize) -> (f64, f64) {
        (zone.width * self.design_scale, zone.height * self.design_scale)
    }

    /// Bring every field back into its legal range for `zone`.
    ///
    /// Rotation is purely visual around the box centre and does not take
    /// part in containment.
    pub fn constrained(&self, zone: ZoneSize, config: &PlacementConfig) -> Self {
        let design_scale = config.clamp_scale(self.design_scale);
        let (x, y) = clamp_offset(self.x, self.y, zone, design_scale);
        Self {
            x,
            y,
            design_scale,
            rotation: normalize_rotation(self.rotation),
        }
    }
}

/// Normalise degrees into `[0, 360)`. Non-finite input becomes 0.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs, and
    // keeps the sign of -0.0.
    if r >= 360.0 || r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Largest `|x|` and `|y|` that keep the design box inside the zone.
pub fn max_offset(zone: ZoneSize, design_scale: f64) -> (f64, f64) {
    let width = zone.width.max(0.0);
    let height = zone.height.max(0.0);
    let max_x = ((width - width * design_scale) / 2.0).max(0.0);
    let max_y = ((height - height * design_scale) / 2.0).max(0.0);
    (max_x, max_y)
}

/// Clamp an offset so the design box stays inside the zone.
pub fn clamp_offset(x: f64, y: f64, zone: ZoneSize, design_scale: f64) -> (f64, f64) {
    let (max_x, max_y) = max_offset(zone, design_scale);
    let x = if x.is_finite() { x.clamp(-max_x, max_x) } else { 0.0 };
    let y = if y.is_finite() { y.clamp(-max_y, max_y) } else { 0.0 };
    (x, y)
}
