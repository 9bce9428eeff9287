//! Constant-ratio design placement.
//!
//! A design's size is stored as a scale factor of its delimitation zone, not
//! as pixels, so it follows the zone when the container is resized or a
//! different product view is shown. Offsets are pixels from the zone centre,
//! always clamped so the design box stays inside the zone.
//!
//! None of the math here returns errors: out-of-range or malformed input is
//! clamped or replaced by a default box.

pub mod geometry;
pub mod numeric;
pub mod session;
pub mod sizing;
pub mod transform;

use std::collections::BTreeMap;

pub use geometry::{ContainerSize, CoordinateType, Delimitation, ImageSize, ScreenRect, ZoneSize};
pub use numeric::{apply_numeric_edit, NumericEdit};
pub use session::{PlacementSession, PointerInput, ProductView, ResizeHandle};
pub use sizing::default_transform;
pub use transform::DesignTransform;

/// Transforms of one product, keyed by delimitation zone index.
pub type TransformMap = BTreeMap<usize, DesignTransform>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest allowed design scale relative to its zone.
pub const MIN_DESIGN_SCALE: f64 = 0.1;

/// Largest allowed design scale: the design never exceeds its zone.
pub const MAX_DESIGN_SCALE: f64 = 1.0;

/// Scale used when nothing better is known.
pub const DEFAULT_DESIGN_SCALE: f64 = 0.8;

/// Default sizing targets this fraction of the average zone size.
pub const DEFAULT_FILL_RATIO: f64 = 0.75;

/// Default sizing never goes below this many pixels.
pub const MIN_DEFAULT_SIZE_PX: f64 = 40.0;

/// Default sizing never exceeds this fraction of the smaller zone dimension.
pub const MAX_DEFAULT_FRACTION: f64 = 0.70;

/// Resize handles cannot shrink the dragged dimension below this.
pub const MIN_HANDLE_SIZE_PX: f64 = 20.0;

/// Shift-rotation snaps to multiples of this many degrees.
pub const ROTATION_SNAP_DEG: f64 = 15.0;

/// Tunable placement parameters, defaulting to the constants above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub fill_ratio: f64,
    pub min_default_size_px: f64,
    pub max_default_fraction: f64,
    pub min_handle_size_px: f64,
    pub rotation_snap_deg: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_DESIGN_SCALE,
            max_scale: MAX_DESIGN_SCALE,
            fill_ratio: DEFAULT_FILL_RATIO,
            min_default_size_px: MIN_DEFAULT_SIZE_PX,
            max_default_fraction: MAX_DEFAULT_FRACTION,
            min_handle_size_px: MIN_HANDLE_SIZE_PX,
            rotation_snap_deg: ROTATION_SNAP_DEG,
        }
    }
}

impl PlacementConfig {
    /// Clamp a scale into `[min_scale, max_scale]`; NaN becomes the default.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return DEFAULT_DESIGN_SCALE.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}
