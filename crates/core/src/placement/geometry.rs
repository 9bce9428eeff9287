//! Delimitation coordinates and `object-fit: contain` layout.
//!
//! Delimitations come either as percentages of the mockup image (0-100) or
//! as pixels of the image's natural size. Both are normalised to percentages
//! and then mapped onto the letterboxed image inside the on-screen container.

use serde::{Deserialize, Serialize};

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width over height; 1.0 for degenerate sizes.
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_valid() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// On-screen size of the element the mockup is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

/// Pixel size of a zone as displayed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSize {
    pub width: f64,
    pub height: f64,
}

/// Unit of a delimitation's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateType {
    Percentage,
    Pixel,
}

/// A rectangle on a mockup image where a design may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delimitation {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub coordinate_type: Option<CoordinateType>,
}

/// A rectangle in percent of the image (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Used for delimitations that cannot be interpreted.
pub const DEFAULT_ZONE: PercentRect = PercentRect {
    x: 25.0,
    y: 25.0,
    width: 50.0,
    height: 50.0,
};

/// A rectangle in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn size(&self) -> ZoneSize {
        ZoneSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

impl Delimitation {
    /// Pixel coordinates are declared explicitly or betrayed by an origin
    /// beyond 100.
    pub fn is_pixel(&self) -> bool {
        self.coordinate_type == Some(CoordinateType::Pixel) || self.x > 100.0 || self.y > 100.0
    }

    /// Normalise to percent of the image, clamped to the image bounds.
    ///
    /// Non-finite values, non-positive sizes, or pixel coordinates without a
    /// usable image size degrade to [`DEFAULT_ZONE`].
    pub fn to_percent(&self, image: ImageSize) -> PercentRect {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return DEFAULT_ZONE;
        }

        let raw = if self.is_pixel() {
            if !image.is_valid() {
                return DEFAULT_ZONE;
            }
            PercentRect {
                x: self.x * 100.0 / image.width,
                y: self.y * 100.0 / image.height,
                width: self.width * 100.0 / image.width,
                height: self.height * 100.0 / image.height,
            }
        } else {
            PercentRect {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            }
        };

        let x = raw.x.clamp(0.0, 100.0);
        let y = raw.y.clamp(0.0, 100.0);
        let width = raw.width.min(100.0 - x);
        let height = raw.height.min(100.0 - y);
        if width <= 0.0 || height <= 0.0 {
            return DEFAULT_ZONE;
        }
        PercentRect { x, y, width, height }
    }
}

/// Where an image lands inside a container under `object-fit: contain`.
///
/// The image is scaled to fit the tighter dimension and centred along the
/// other one.
pub fn fit_contain(container: ContainerSize, image: ImageSize) -> ScreenRect {
    if !image.is_valid() || !(container.width > 0.0 && container.height > 0.0) {
        return ScreenRect {
            left: 0.0,
            top: 0.0,
            width: container.width.max(0.0),
            height: container.height.max(0.0),
        };
    }

    let container_ratio = container.width / container.height;
    let image_ratio = image.width / image.height;

    if image_ratio > container_ratio {
        let height = container.width / image_ratio;
        ScreenRect {
            left: 0.0,
            top: (container.height - height) / 2.0,
            width: container.width,
            height,
        }
    } else {
        let width = container.height * image_ratio;
        ScreenRect {
            left: (container.width - width) / 2.0,
            top: 0.0,
            width,
            height: container.height,
        }
    }
}

/// Map a percent rectangle onto the displayed image.
pub fn percent_to_screen(rect: PercentRect, displayed: ScreenRect) -> ScreenRect {
    ScreenRect {
        left: displayed.left + rect.x / 100.0 * displayed.width,
        top: displayed.top + rect.y / 100.0 * displayed.height,
        width: rect.width / 100.0 * displayed.width,
        height: rect.height / 100.0 * displayed.height,
    }
}

/// Full pipeline: delimitation -> percent -> letterboxed screen rectangle.
pub fn zone_screen_rect(
    delimitation: &Delimitation,
    image: ImageSize,
    container: ContainerSize,
) -> ScreenRect {
    percent_to_screen(delimitation.to_percent(image), fit_contain(container, image))
}
