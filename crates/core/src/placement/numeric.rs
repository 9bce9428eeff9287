//! Numeric side-panel edits (width / height in px, scale in percent).
//!
//! Both this panel and the resize handles derive the new scale through
//! [`scale_for_box`], so typing a box size and dragging to the same box
//! produce the same `design_scale`.

use serde::{Deserialize, Serialize};

use super::geometry::ZoneSize;
use super::transform::DesignTransform;
use super::PlacementConfig;

/// A value typed into the numeric panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum NumericEdit {
    WidthPx(f64),
    HeightPx(f64),
    ScalePercent(f64),
}

/// Scale that fits a `width` x `height` display box into `zone`.
///
/// Uses the tighter axis and clamps into the configured scale range.
pub fn scale_for_box(width: f64, height: f64, zone: ZoneSize, config: &PlacementConfig) -> f64 {
    if !(zone.width > 0.0 && zone.height > 0.0) {
        return config.clamp_scale(f64::NAN);
    }
    config.clamp_scale((width / zone.width).min(height / zone.height))
}

/// Apply a numeric edit to the transform of `zone`.
///
/// With `aspect_locked`, editing one dimension derives the other from
/// `design_aspect` (width over height); otherwise the other dimension keeps
/// the current design box size. Offsets are re-clamped for the new scale.
pub fn apply_numeric_edit(
    transform: &DesignTransform,
    zone: ZoneSize,
    edit: NumericEdit,
    design_aspect: f64,
    aspect_locked: bool,
    config: &PlacementConfig,
) -> DesignTransform {
    let aspect = if design_aspect.is_finite() && design_aspect > 0.0 {
        design_aspect
    } else {
        1.0
    };
    let (current_width, current_height) = transform.design_box(zone);

    let design_scale = match edit {
        NumericEdit::WidthPx(width) => {
            let height = if aspect_locked { width / aspect } else { current_height };
            scale_for_box(width, height, zone, config)
        }
        NumericEdit::HeightPx(height) => {
            let width = if aspect_locked { height * aspect } else { current_width };
            scale_for_box(width, height, zone, config)
        }
        NumericEdit::ScalePercent(percent) => config.clamp_scale(percent / 100.0),
    };

    DesignTransform {
        design_scale,
        ..*transform
    }
    .constrained(zone, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: ZoneSize = ZoneSize { width: 200.0, height: 100.0 };

    #[test]
    fn width_edit_with_lock_uses_aspect() {
        let t = DesignTransform::with_scale(0.5);
        let next = apply_numeric_edit(&t, ZONE, NumericEdit::WidthPx(160.0), 2.0, true, &PlacementConfig::default());
        // 160x80 box: min(0.8, 0.8)
        assert!((next.design_scale - 0.8).abs() < 1e-9);
    }

    #[test]
    fn width_edit_without_lock_keeps_height() {
        let t = DesignTransform::with_scale(0.5);
        let next = apply_numeric_edit(&t, ZONE, NumericEdit::WidthPx(180.0), 2.0, false, &PlacementConfig::default());
        // 180x50 box: min(0.9, 0.5)
        assert!((next.design_scale - 0.5).abs() < 1e-9);
    }

    #[test]
    fn scale_percent_is_clamped() {
        let t = DesignTransform::default();
        let config = PlacementConfig::default();
        assert_eq!(apply_numeric_edit(&t, ZONE, NumericEdit::ScalePercent(250.0), 1.0, true, &config).design_scale, 1.0);
        assert_eq!(apply_numeric_edit(&t, ZONE, NumericEdit::ScalePercent(2.0), 1.0, true, &config).design_scale, 0.1);
    }

    #[test]
    fn growing_scale_reclamps_offset() {
        let t = DesignTransform { x: 40.0, y: 0.0, design_scale: 0.5, rotation: 0.0 };
        let next = apply_numeric_edit(&t, ZONE, NumericEdit::ScalePercent(90.0), 1.0, true, &PlacementConfig::default());
        assert!((next.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_zone_falls_back_to_default_scale() {
        let zone = ZoneSize { width: 0.0, height: 0.0 };
        assert_eq!(scale_for_box(10.0, 10.0, zone, &PlacementConfig::default()), 0.8);
    }
}
