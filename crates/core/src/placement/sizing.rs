//! Initial ("optimal") design size for a product's zones.

use super::geometry::{ImageSize, ZoneSize};
use super::transform::DesignTransform;
use super::PlacementConfig;

fn usable(zone: &ZoneSize) -> bool {
    zone.width.is_finite() && zone.height.is_finite() && zone.width > 0.0 && zone.height > 0.0
}

/// Mean width and height of the usable zones.
pub fn average_zone(zones: &[ZoneSize]) -> Option<ZoneSize> {
    let usable_zones: Vec<&ZoneSize> = zones.iter().filter(|z| usable(z)).collect();
    if usable_zones.is_empty() {
        return None;
    }
    let count = usable_zones.len() as f64;
    Some(ZoneSize {
        width: usable_zones.iter().map(|z| z.width).sum::<f64>() / count,
        height: usable_zones.iter().map(|z| z.height).sum::<f64>() / count,
    })
}

/// Pixel size the design should start at, given every zone of every view.
///
/// The target is `fill_ratio` of the average zone size, at least
/// `min_default_size_px`, and at most `max_default_fraction` of the smaller
/// average dimension. The longer side of the design gets the target; the
/// other follows the design's natural aspect ratio.
pub fn default_design_size(
    design: ImageSize,
    zones: &[ZoneSize],
    config: &PlacementConfig,
) -> Option<(f64, f64)> {
    let avg = average_zone(zones)?;
    let average = (avg.width + avg.height) / 2.0;

    let ceiling = config.max_default_fraction * avg.width.min(avg.height);
    let target = (average * config.fill_ratio)
        .max(config.min_default_size_px)
        .min(ceiling);

    let aspect = design.aspect_ratio();
    let size = if aspect >= 1.0 {
        (target, target / aspect)
    } else {
        (target * aspect, target)
    };
    Some(size)
}

/// Default transform: centred, unrotated, scaled to the default size.
///
/// The scale is the smaller of the per-axis ratios against the average zone,
/// so the design box never overflows on either axis.
pub fn default_transform(
    design: ImageSize,
    zones: &[ZoneSize],
    config: &PlacementConfig,
) -> DesignTransform {
    let (Some((width, height)), Some(avg)) =
        (default_design_size(design, zones, config), average_zone(zones))
    else {
        return DesignTransform::default();
    };

    let scale = (width / avg.width).min(height / avg.height);
    DesignTransform::with_scale(config.clamp_scale(scale))
}

/// Size the design artwork is drawn at: its natural aspect ratio fitted
/// inside the design box.
pub fn rendered_design_size(transform: &DesignTransform, zone: ZoneSize, design: ImageSize) -> (f64, f64) {
    let (box_width, box_height) = transform.design_box(zone);
    if box_width <= 0.0 || box_height <= 0.0 {
        return (0.0, 0.0);
    }
    let aspect = design.aspect_ratio();
    if aspect > box_width / box_height {
        (box_width, box_width / aspect)
    } else {
        (box_height * aspect, box_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: ZoneSize = ZoneSize { width: 200.0, height: 200.0 };

    #[test]
    fn wide_design_in_square_zone() {
        let design = ImageSize { width: 100.0, height: 50.0 };
        let config = PlacementConfig::default();

        let (w, h) = default_design_size(design, &[SQUARE], &config).unwrap();
        assert!((w - 140.0).abs() < 1e-9);
        assert!((w / h - 2.0).abs() < 1e-9);

        let t = default_transform(design, &[SQUARE], &config);
        let (rendered_w, rendered_h) = rendered_design_size(&t, SQUARE, design);
        assert!(rendered_w <= 140.0 + 1e-9);
        assert!((rendered_w / rendered_h - 2.0).abs() < 1e-9);
        assert_eq!((t.x, t.y, t.rotation), (0.0, 0.0, 0.0));
    }

    #[test]
    fn tall_design_uses_height_as_long_side() {
        let design = ImageSize { width: 50.0, height: 100.0 };
        let (w, h) = default_design_size(design, &[SQUARE], &PlacementConfig::default()).unwrap();
        assert!((h - 140.0).abs() < 1e-9);
        assert!((w - 70.0).abs() < 1e-9);
    }

    #[test]
    fn averages_across_views() {
        let zones = [
            ZoneSize { width: 100.0, height: 100.0 },
            ZoneSize { width: 300.0, height: 300.0 },
        ];
        let square = ImageSize { width: 10.0, height: 10.0 };
        let (w, _) = default_design_size(square, &zones, &PlacementConfig::default()).unwrap();
        assert!((w - 140.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_zones_respect_ceiling_over_floor() {
        let zones = [ZoneSize { width: 30.0, height: 30.0 }];
        let square = ImageSize { width: 10.0, height: 10.0 };
        let (w, _) = default_design_size(square, &zones, &PlacementConfig::default()).unwrap();
        assert!((w - 21.0).abs() < 1e-9);
    }

    #[test]
    fn no_usable_zones_gives_plain_default() {
        let design = ImageSize { width: 10.0, height: 10.0 };
        let zones = [ZoneSize { width: 0.0, height: 50.0 }];
        assert_eq!(
            default_transform(design, &zones, &PlacementConfig::default()),
            DesignTransform::default()
        );
    }

    #[test]
    fn default_scale_is_always_in_range() {
        let config = PlacementConfig::default();
        let designs = [
            ImageSize { width: 1.0, height: 1000.0 },
            ImageSize { width: 1000.0, height: 1.0 },
            ImageSize { width: 0.0, height: 0.0 },
        ];
        for design in designs {
            let t = default_transform(design, &[SQUARE], &config);
            assert!(t.design_scale >= config.min_scale && t.design_scale <= config.max_scale);
        }
    }
}
