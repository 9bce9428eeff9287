//! Designs: vendor artwork shared between products.
//!
//! A design is referenced, never owned, by vendor products. Identical uploads
//! are deduplicated through a content fingerprint so N products can point at
//! one design and follow its validation together.

use std::collections::HashMap;
use std::io::Cursor;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::placement::geometry::ImageSize;
use crate::types::{DbId, Timestamp};

/// Admin review state of a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignValidationStatus {
    Pending,
    Validated,
    Rejected,
}

/// A design as fetched from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub id: DbId,
    pub name: String,
    pub image_url: String,
    pub is_validated: bool,
    pub validation_status: DesignValidationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub validated_at: Option<Timestamp>,
    /// Pixel size read from the uploaded image, when it could be read.
    #[serde(default)]
    pub natural_size: Option<ImageSize>,
}

impl Design {
    /// Natural size to lay the design out with.
    pub fn placement_size(&self) -> ImageSize {
        self.natural_size
            .filter(ImageSize::is_valid)
            .unwrap_or(FALLBACK_DESIGN_SIZE)
    }

    /// Snapshot of the fields the cascade consumes.
    pub fn validation(&self) -> DesignValidation {
        DesignValidation {
            is_validated: self.is_validated,
            status: self.validation_status,
            rejection_reason: self.rejection_reason.clone(),
            name: self.name.clone(),
        }
    }
}

/// Answer of `getDesignValidationStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignValidation {
    pub is_validated: bool,
    pub status: DesignValidationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Outcome of registering an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignRegistration {
    pub design_id: DbId,
    pub is_design_reused: bool,
}

/// Content fingerprint of an upload: lowercase hex SHA-256.
fn fingerprint(image: &[u8]) -> String {
    format!("{:x}", Sha256::digest(image))
}

/// Fingerprint index of known designs.
#[derive(Debug, Default, Clone)]
pub struct DesignRegistry {
    by_fingerprint: HashMap<String, DbId>,
}

impl DesignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an upload by content, or record it under `new_id`.
    pub fn register(&mut self, image: &[u8], new_id: DbId) -> DesignRegistration {
        let key = fingerprint(image);
        match self.by_fingerprint.get(&key) {
            Some(&design_id) => DesignRegistration {
                design_id,
                is_design_reused: true,
            },
            None => {
                self.by_fingerprint.insert(key, new_id);
                DesignRegistration {
                    design_id: new_id,
                    is_design_reused: false,
                }
            }
        }
    }

    pub fn find(&self, image: &[u8]) -> Option<DbId> {
        self.by_fingerprint.get(&fingerprint(image)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_fingerprint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fingerprint.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Image probing
// ---------------------------------------------------------------------------

/// Natural size used when an upload's header cannot be read.
pub const FALLBACK_DESIGN_SIZE: ImageSize = ImageSize {
    width: 100.0,
    height: 100.0,
};

/// Read the pixel dimensions from an image header without decoding it.
pub fn probe_design_size(bytes: &[u8]) -> Result<ImageSize, CoreError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("unreadable design image: {e}")))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("unreadable design image: {e}")))?;
    Ok(ImageSize {
        width: f64::from(width),
        height: f64::from(height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_hex_sha256() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_uploads_are_reused() {
        let mut registry = DesignRegistry::new();
        let first = registry.register(b"artwork", 10);
        let second = registry.register(b"artwork", 11);
        assert_eq!(first, DesignRegistration { design_id: 10, is_design_reused: false });
        assert_eq!(second, DesignRegistration { design_id: 10, is_design_reused: true });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_uploads_get_new_ids() {
        let mut registry = DesignRegistry::new();
        registry.register(b"a", 1);
        let b = registry.register(b"b", 2);
        assert!(!b.is_design_reused);
        assert_eq!(registry.find(b"b"), Some(2));
        assert_eq!(registry.find(b"c"), None);
    }

    #[test]
    fn probe_reads_png_header() {
        // 1x1 transparent PNG.
        let png: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ];
        let size = probe_design_size(png).unwrap();
        assert_eq!(size, ImageSize { width: 1.0, height: 1.0 });
    }

    #[test]
    fn placement_size_ignores_unusable_sizes() {
        let mut design: Design = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Logo",
            "imageUrl": "https://cdn.example/logo.png",
            "isValidated": false,
            "validationStatus": "PENDING",
        }))
        .unwrap();
        assert_eq!(design.placement_size(), FALLBACK_DESIGN_SIZE);

        design.natural_size = Some(ImageSize { width: 0.0, height: 40.0 });
        assert_eq!(design.placement_size(), FALLBACK_DESIGN_SIZE);

        design.natural_size = Some(ImageSize { width: 300.0, height: 150.0 });
        assert_eq!(design.placement_size(), ImageSize { width: 300.0, height: 150.0 });
    }

    #[test]
    fn garbage_is_unreadable() {
        assert_matches::assert_matches!(
            probe_design_size(b"not an image"),
            Err(CoreError::Validation(msg)) if msg.starts_with("unreadable design image")
        );
    }
}
