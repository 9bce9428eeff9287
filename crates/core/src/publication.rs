//! Publication state machine for vendor products.
//!
//! ```text
//!   PENDING --design validated, AUTO_PUBLISH--> PUBLISHED
//!   PENDING --design validated, TO_DRAFT------> DRAFT
//!   DRAFT   --vendor publish (validated or not)--> PUBLISHED
//! ```
//!
//! `PUBLISHED` is terminal. Every function here takes the current product by
//! reference and returns the next value; nothing is mutated in place.

use crate::design::DesignValidation;
use crate::error::CoreError;
use crate::product::{PostValidationAction, ProductStatus, VendorProduct};
use crate::types::Timestamp;

/// Initial status for a newly created product.
///
/// Only `PENDING` and `DRAFT` can be forced; publishing always goes through
/// validation or an explicit vendor action.
pub fn initial_status(forced: Option<ProductStatus>) -> Result<ProductStatus, CoreError> {
    match forced {
        None | Some(ProductStatus::Pending) => Ok(ProductStatus::Pending),
        Some(ProductStatus::Draft) => Ok(ProductStatus::Draft),
        Some(ProductStatus::Published) => Err(CoreError::Validation(
            "a new product cannot be created as PUBLISHED".to_string(),
        )),
    }
}

/// Change what happens once the design is validated.
///
/// Only pending products accept the change; the action is inert afterwards.
pub fn update_post_validation_action(
    product: &VendorProduct,
    action: PostValidationAction,
    now: Timestamp,
) -> Result<VendorProduct, CoreError> {
    if product.status != ProductStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "post-validation action of product {} cannot change while {}",
            product.id, product.status
        )));
    }

    let mut next = product.clone();
    if next.post_validation_action != action {
        next.post_validation_action = action;
        next.updated_at = now;
    }
    Ok(next)
}

/// Publish a draft. Unvalidated drafts are allowed at the vendor's own risk.
pub fn publish_draft(product: &VendorProduct, now: Timestamp) -> Result<VendorProduct, CoreError> {
    if product.status != ProductStatus::Draft {
        return Err(CoreError::NotDraft {
            id: product.id,
            status: product.status,
        });
    }

    let mut next = product.clone();
    next.status = ProductStatus::Published;
    next.published_at = Some(now);
    next.updated_at = now;
    Ok(next)
}

/// Reflect a design's validation state onto one dependent product.
///
/// A pending product moves according to its own post-validation action when
/// the design is validated. Products in any other status only mirror
/// `is_validated`. Rejection and pending designs never move the status.
pub fn apply_design_validation(
    product: &VendorProduct,
    validation: &DesignValidation,
    now: Timestamp,
) -> VendorProduct {
    let mut next = product.clone();

    if validation.is_validated {
        if product.status == ProductStatus::Pending {
            let target = product.post_validation_action.target_status();
            next.status = target;
            if target == ProductStatus::Published {
                next.published_at = Some(now);
            }
        }
        next.is_validated = true;
        if next.validated_at.is_none() {
            next.validated_at = Some(now);
        }
    } else {
        next.is_validated = false;
    }

    if next != *product {
        next.updated_at = now;
    }
    next
}
