//! Vendor product model, workflow ingestion, and creation payload rules.
//!
//! Raw product records arrive from the catalog API in several historical
//! shapes (explicit `postValidationAction`, or the older `workflow` /
//! `pendingAutoPublish` flags). [`VendorProduct::ingest`] resolves them once
//! into a single typed record so nothing downstream re-derives the workflow.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_DRAFT: &str = "DRAFT";
pub const STATUS_PUBLISHED: &str = "PUBLISHED";

/// All valid product status strings.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_DRAFT, STATUS_PUBLISHED];

pub const ACTION_AUTO_PUBLISH: &str = "AUTO_PUBLISH";
pub const ACTION_TO_DRAFT: &str = "TO_DRAFT";

/// All valid post-validation action strings.
pub const VALID_ACTIONS: &[&str] = &[ACTION_AUTO_PUBLISH, ACTION_TO_DRAFT];

/// Legacy `workflow` value meaning "publish as soon as the design is approved".
pub const LEGACY_WORKFLOW_AUTO: &str = "AUTO-PUBLISH";

/// Legacy `workflow` value meaning "wait for the vendor to publish manually".
pub const LEGACY_WORKFLOW_MANUAL: &str = "MANUAL-PUBLISH";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a vendor product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Pending,
    Draft,
    Published,
}

impl ProductStatus {
    /// Convert to the API string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Draft => STATUS_DRAFT,
            Self::Published => STATUS_PUBLISHED,
        }
    }

    /// Parse an API string value. Matching is case-insensitive because
    /// older records were stored in lowercase.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_uppercase().as_str() {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_PUBLISHED => Ok(Self::Published),
            _ => Err(CoreError::Validation(format!(
                "Invalid product status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a pending product once its design is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostValidationAction {
    AutoPublish,
    ToDraft,
}

impl PostValidationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoPublish => ACTION_AUTO_PUBLISH,
            Self::ToDraft => ACTION_TO_DRAFT,
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_uppercase().as_str() {
            ACTION_AUTO_PUBLISH => Ok(Self::AutoPublish),
            ACTION_TO_DRAFT => Ok(Self::ToDraft),
            _ => Err(CoreError::Validation(format!(
                "Invalid post-validation action '{s}'. Must be one of: {}",
                VALID_ACTIONS.join(", ")
            ))),
        }
    }

    /// The status a pending product moves to when its design is validated.
    pub fn target_status(&self) -> ProductStatus {
        match self {
            Self::AutoPublish => ProductStatus::Published,
            Self::ToDraft => ProductStatus::Draft,
        }
    }
}

impl Default for PostValidationAction {
    fn default() -> Self {
        Self::AutoPublish
    }
}

/// How a product's lifecycle is driven, resolved once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ProductWorkflow {
    /// Pre-cascade record: validation is tracked on the product itself by
    /// the backend, so client-side design cascades leave it alone.
    Legacy,
    /// Status follows the linked design's validation.
    Cascade,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Read-only descriptor of the admin mockup a product is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseProductRef {
    pub id: DbId,
    pub name: String,
    /// Floor price in the smallest currency unit.
    pub price: i64,
}

/// A product a vendor sells: a design applied to a base mockup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProduct {
    pub id: DbId,
    pub vendor_name: String,
    pub vendor_description: String,
    pub vendor_price: i64,
    pub vendor_stock: u32,
    pub status: ProductStatus,
    pub is_validated: bool,
    /// Only meaningful while `status == PENDING`.
    pub post_validation_action: PostValidationAction,
    pub workflow: ProductWorkflow,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub validated_at: Option<Timestamp>,
    pub published_at: Option<Timestamp>,
    pub design_id: Option<DbId>,
    pub base_product: Option<BaseProductRef>,
}

impl VendorProduct {
    /// Whether a design validation event can move this product.
    pub fn follows_design(&self, design_id: DbId) -> bool {
        self.workflow == ProductWorkflow::Cascade && self.design_id == Some(design_id)
    }

    /// Resolve a raw API record into a typed product.
    ///
    /// Workflow resolution order:
    /// 1. an explicit `postValidationAction` makes it a cascade product;
    /// 2. otherwise legacy `workflow` / `pendingAutoPublish` flags make it a
    ///    legacy product (`MANUAL-PUBLISH` maps to `TO_DRAFT`);
    /// 3. otherwise a linked design makes it a cascade product with the
    ///    default action, and no design at all makes it legacy.
    pub fn ingest(raw: RawVendorProduct) -> Result<Self, CoreError> {
        let status = match raw.status.as_deref() {
            Some(s) => ProductStatus::from_str_value(s)?,
            None => ProductStatus::Pending,
        };

        let (workflow, post_validation_action) = match raw.post_validation_action.as_deref() {
            Some(action) => (
                ProductWorkflow::Cascade,
                PostValidationAction::from_str_value(action)?,
            ),
            None if raw.workflow.is_some() || raw.pending_auto_publish.is_some() => {
                let manual = raw
                    .workflow
                    .as_deref()
                    .is_some_and(|w| w.eq_ignore_ascii_case(LEGACY_WORKFLOW_MANUAL));
                let action = if manual || raw.pending_auto_publish == Some(false) {
                    PostValidationAction::ToDraft
                } else {
                    PostValidationAction::AutoPublish
                };
                (ProductWorkflow::Legacy, action)
            }
            None if raw.design_id.is_some() => {
                (ProductWorkflow::Cascade, PostValidationAction::default())
            }
            None => (ProductWorkflow::Legacy, PostValidationAction::default()),
        };

        let vendor_stock = u32::try_from(raw.vendor_stock).map_err(|_| {
            CoreError::Validation(format!(
                "Product {} has invalid stock {}",
                raw.id, raw.vendor_stock
            ))
        })?;

        Ok(Self {
            id: raw.id,
            vendor_name: raw.vendor_name,
            vendor_description: raw.vendor_description.unwrap_or_default(),
            vendor_price: raw.vendor_price,
            vendor_stock,
            status,
            is_validated: raw.is_validated.unwrap_or(false),
            post_validation_action,
            workflow,
            created_at: raw.created_at,
            updated_at: raw.updated_at.unwrap_or(raw.created_at),
            validated_at: raw.validated_at,
            published_at: raw.published_at,
            design_id: raw.design_id,
            base_product: raw.base_product,
        })
    }
}

/// A product record as delivered by the catalog API, before workflow
/// resolution. Every lifecycle field is optional because the shape varies
/// between record generations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVendorProduct {
    pub id: DbId,
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_description: Option<String>,
    pub vendor_price: i64,
    #[serde(default)]
    pub vendor_stock: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_validated: Option<bool>,
    #[serde(default)]
    pub post_validation_action: Option<String>,
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub pending_auto_publish: Option<bool>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub validated_at: Option<Timestamp>,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub design_id: Option<DbId>,
    #[serde(default)]
    pub base_product: Option<BaseProductRef>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Where the artwork for a new product comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum DesignSource {
    /// Reuse a design the vendor already uploaded.
    Existing { design_id: DbId },
    /// Upload new artwork. Identical bytes resolve to an existing design.
    Upload { name: String, image: Vec<u8> },
}

/// Payload for the product-creation flow.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub base_product_id: DbId,
    #[validate(length(min = 1, max = 120, message = "vendor name must be 1-120 characters"))]
    pub vendor_name: String,
    #[validate(length(max = 2000, message = "vendor description is too long"))]
    pub vendor_description: String,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub vendor_price: i64,
    pub vendor_stock: u32,
    #[validate(length(min = 1, message = "select at least one color"))]
    pub selected_color_ids: Vec<DbId>,
    #[validate(length(min = 1, message = "select at least one size"))]
    pub selected_sizes: Vec<String>,
    pub design: DesignSource,
    pub post_validation_action: PostValidationAction,
    /// Explicit initial status; `None` means `PENDING`.
    #[serde(default)]
    pub forced_status: Option<ProductStatus>,
}

/// Result of a successful creation, used for design deduplication reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProduct {
    pub product_id: DbId,
    pub design_id: DbId,
    pub is_design_reused: bool,
    pub status: ProductStatus,
    pub message: String,
}

/// Validate a creation payload against form rules and the base product's
/// price floor (`vendor_price >= base_price`).
pub fn validate_create_payload(
    payload: &CreateProductPayload,
    base_price: i64,
) -> Result<(), CoreError> {
    payload
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    if payload.vendor_price < base_price {
        return Err(CoreError::Validation(format!(
            "price {} is below the base product price {base_price}",
            payload.vendor_price
        )));
    }

    if let DesignSource::Upload { name, image } = &payload.design {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("design name is required".to_string()));
        }
        if image.is_empty() {
            return Err(CoreError::Validation("design image is empty".to_string()));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    pub(crate) fn ts(hour: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    pub(crate) fn product(id: DbId, design_id: Option<DbId>, action: PostValidationAction) -> VendorProduct {
        VendorProduct {
            id,
            vendor_name: format!("Product {id}"),
            vendor_description: String::new(),
            vendor_price: 2500,
            vendor_stock: 10,
            status: ProductStatus::Pending,
            is_validated: false,
            post_validation_action: action,
            workflow: ProductWorkflow::Cascade,
            created_at: ts(8),
            updated_at: ts(8),
            validated_at: None,
            published_at: None,
            design_id,
            base_product: None,
        }
    }

    fn raw(json: serde_json::Value) -> RawVendorProduct {
        serde_json::from_value(json).unwrap()
    }

    fn payload() -> CreateProductPayload {
        CreateProductPayload {
            base_product_id: 1,
            vendor_name: "Sunset tee".to_string(),
            vendor_description: String::new(),
            vendor_price: 3000,
            vendor_stock: 5,
            selected_color_ids: vec![1],
            selected_sizes: vec!["M".to_string()],
            design: DesignSource::Existing { design_id: 9 },
            post_validation_action: PostValidationAction::ToDraft,
            forced_status: None,
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(ProductStatus::from_str_value("draft").unwrap(), ProductStatus::Draft);
        assert_eq!(ProductStatus::from_str_value("PUBLISHED").unwrap(), ProductStatus::Published);
        assert!(ProductStatus::from_str_value("archived").is_err());
    }

    #[test]
    fn action_targets() {
        assert_eq!(PostValidationAction::AutoPublish.target_status(), ProductStatus::Published);
        assert_eq!(PostValidationAction::ToDraft.target_status(), ProductStatus::Draft);
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_value(ProductStatus::Published).unwrap();
        assert_eq!(json, "PUBLISHED");
        let json = serde_json::to_value(PostValidationAction::ToDraft).unwrap();
        assert_eq!(json, "TO_DRAFT");
    }

    #[test]
    fn ingest_explicit_action_is_cascade() {
        let p = VendorProduct::ingest(raw(serde_json::json!({
            "id": 1, "vendorName": "A", "vendorPrice": 100,
            "status": "PENDING", "postValidationAction": "TO_DRAFT",
            "createdAt": "2024-05-01T08:00:00Z", "designId": 4
        })))
        .unwrap();
        assert_eq!(p.workflow, ProductWorkflow::Cascade);
        assert_eq!(p.post_validation_action, PostValidationAction::ToDraft);
        assert_eq!(p.updated_at, p.created_at);
    }

    #[test]
    fn ingest_legacy_manual_workflow_maps_to_draft() {
        let p = VendorProduct::ingest(raw(serde_json::json!({
            "id": 2, "vendorName": "B", "vendorPrice": 100,
            "workflow": "MANUAL-PUBLISH", "createdAt": "2024-05-01T08:00:00Z"
        })))
        .unwrap();
        assert_eq!(p.workflow, ProductWorkflow::Legacy);
        assert_eq!(p.post_validation_action, PostValidationAction::ToDraft);
        assert_eq!(p.status, ProductStatus::Pending);
    }

    #[test]
    fn ingest_legacy_pending_auto_publish() {
        let p = VendorProduct::ingest(raw(serde_json::json!({
            "id": 3, "vendorName": "C", "vendorPrice": 100,
            "pendingAutoPublish": true, "status": "pending",
            "createdAt": "2024-05-01T08:00:00Z"
        })))
        .unwrap();
        assert_eq!(p.workflow, ProductWorkflow::Legacy);
        assert_eq!(p.post_validation_action, PostValidationAction::AutoPublish);
    }

    #[test]
    fn ingest_design_without_action_defaults_to_cascade() {
        let p = VendorProduct::ingest(raw(serde_json::json!({
            "id": 4, "vendorName": "D", "vendorPrice": 100,
            "createdAt": "2024-05-01T08:00:00Z", "designId": 7
        })))
        .unwrap();
        assert_eq!(p.workflow, ProductWorkflow::Cascade);
        assert!(p.follows_design(7));
        assert!(!p.follows_design(8));
    }

    #[test]
    fn ingest_rejects_bad_status_and_stock() {
        let bad_status = VendorProduct::ingest(raw(serde_json::json!({
            "id": 5, "vendorName": "E", "vendorPrice": 100, "status": "ARCHIVED",
            "createdAt": "2024-05-01T08:00:00Z"
        })));
        assert_matches!(bad_status, Err(CoreError::Validation(_)));

        let bad_stock = VendorProduct::ingest(raw(serde_json::json!({
            "id": 6, "vendorName": "F", "vendorPrice": 100, "vendorStock": -1,
            "createdAt": "2024-05-01T08:00:00Z"
        })));
        assert_matches!(bad_stock, Err(CoreError::Validation(_)));
    }

    #[test]
    fn payload_valid() {
        assert!(validate_create_payload(&payload(), 2000).is_ok());
    }

    #[test]
    fn payload_below_price_floor_rejected() {
        let err = validate_create_payload(&payload(), 3500).unwrap_err();
        assert_matches!(&err, CoreError::Validation(msg) if msg.contains("below the base product price"));
    }

    #[test]
    fn payload_without_sizes_rejected() {
        let mut p = payload();
        p.selected_sizes.clear();
        assert_matches!(validate_create_payload(&p, 0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn payload_empty_upload_rejected() {
        let mut p = payload();
        p.design = DesignSource::Upload { name: "Logo".to_string(), image: Vec::new() };
        assert_matches!(validate_create_payload(&p, 0), Err(CoreError::Validation(_)));
    }
}
