//! Design validation cascade and refresh reconciliation.
//!
//! When a shared design changes validation state, every cascade product
//! referencing it is updated according to its own post-validation action.
//! The functions here are pure: they take the current in-memory batch and
//! freshly fetched data, and return the next batch plus a diff suitable for
//! notifications.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::design::DesignValidation;
use crate::product::{ProductStatus, VendorProduct};
use crate::publication::apply_design_validation;
use crate::types::{DbId, Timestamp};

/// Why a product changed during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CascadeReason {
    /// Design validated and the product was published automatically.
    AutoPublished,
    /// Design validated and the product was moved to draft.
    MovedToDraft,
    /// Design validated; only the product's `is_validated` flag changed.
    ValidationReflected,
    /// Design was rejected (or returned to review).
    DesignRejected { reason: Option<String> },
    /// The catalog reported a different state than we held locally.
    ServerUpdate,
}

/// One product's before/after for a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeChange {
    pub product_id: DbId,
    pub product_name: String,
    pub design_id: Option<DbId>,
    pub previous_status: ProductStatus,
    pub status: ProductStatus,
    pub was_validated: bool,
    pub is_validated: bool,
    pub reason: CascadeReason,
}

/// Result of [`refresh_and_cascade`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutcome {
    pub products: Vec<VendorProduct>,
    pub changes: Vec<CascadeChange>,
}

fn changed(before: &VendorProduct, after: &VendorProduct) -> bool {
    before.status != after.status || before.is_validated != after.is_validated
}

fn change_between(
    before: &VendorProduct,
    after: &VendorProduct,
    reason: CascadeReason,
) -> CascadeChange {
    CascadeChange {
        product_id: after.id,
        product_name: after.vendor_name.clone(),
        design_id: after.design_id,
        previous_status: before.status,
        status: after.status,
        was_validated: before.is_validated,
        is_validated: after.is_validated,
        reason,
    }
}

fn cascade_reason(
    before: &VendorProduct,
    after: &VendorProduct,
    validation: &DesignValidation,
) -> CascadeReason {
    if !validation.is_validated {
        return CascadeReason::DesignRejected {
            reason: validation.rejection_reason.clone(),
        };
    }
    match (before.status, after.status) {
        (ProductStatus::Pending, ProductStatus::Published) => CascadeReason::AutoPublished,
        (ProductStatus::Pending, ProductStatus::Draft) => CascadeReason::MovedToDraft,
        _ => CascadeReason::ValidationReflected,
    }
}

/// Apply fresh design validation states to a batch of products.
///
/// Products whose design is absent from `latest_designs`, products without a
/// design, and legacy products pass through untouched. Never fails: missing
/// data means no change. Output order matches input order.
pub fn refresh_and_cascade(
    products: &[VendorProduct],
    latest_designs: &HashMap<DbId, DesignValidation>,
    now: Timestamp,
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome {
        products: Vec::with_capacity(products.len()),
        changes: Vec::new(),
    };

    for product in products {
        let validation = product
            .design_id
            .filter(|&design_id| product.follows_design(design_id))
            .and_then(|design_id| latest_designs.get(&design_id));

        let Some(validation) = validation else {
            outcome.products.push(product.clone());
            continue;
        };

        let next = apply_design_validation(product, validation, now);
        if changed(product, &next) {
            tracing::debug!(
                product_id = product.id,
                design_id = ?product.design_id,
                from = %product.status,
                to = %next.status,
                "Design cascade transitioned product"
            );
            let reason = cascade_reason(product, &next, validation);
            outcome.changes.push(change_between(product, &next, reason));
        }
        outcome.products.push(next);
    }

    outcome
}

/// Diff two snapshots of the same product set, keyed by id.
///
/// Only products present in both snapshots with a different status or
/// validation flag are reported. A change is attributed to the product's
/// design when `latest_designs` holds that design and applying it to the
/// earlier snapshot yields the same status and validation flag; anything
/// else is a [`CascadeReason::ServerUpdate`].
pub fn diff_products(
    before: &[VendorProduct],
    after: &[VendorProduct],
    latest_designs: &HashMap<DbId, DesignValidation>,
) -> Vec<CascadeChange> {
    let previous: HashMap<DbId, &VendorProduct> = before.iter().map(|p| (p.id, p)).collect();

    after
        .iter()
        .filter_map(|next| {
            let prev = previous.get(&next.id)?;
            if !changed(prev, next) {
                return None;
            }
            let reason = prev
                .design_id
                .filter(|&design_id| prev.follows_design(design_id))
                .and_then(|design_id| latest_designs.get(&design_id))
                .filter(|validation| {
                    let expected = apply_design_validation(prev, validation, next.updated_at);
                    !changed(&expected, next)
                })
                .map(|validation| cascade_reason(prev, next, validation))
                .unwrap_or(CascadeReason::ServerUpdate);
            Some(change_between(prev, next, reason))
        })
        .collect()
}

/// Merge a refreshed product list over local state.
///
/// The refreshed list is authoritative for membership and order. For a
/// product known locally, the local copy wins only when its `updated_at` is
/// strictly newer, which protects an in-flight manual publish from being
/// overwritten by a stale refresh.
pub fn merge_refreshed(local: &[VendorProduct], refreshed: Vec<VendorProduct>) -> Vec<VendorProduct> {
    let local_by_id: HashMap<DbId, &VendorProduct> = local.iter().map(|p| (p.id, p)).collect();

    refreshed
        .into_iter()
        .map(|remote| match local_by_id.get(&remote.id) {
            Some(mine) if mine.updated_at > remote.updated_at => (*mine).clone(),
            _ => remote,
        })
        .collect()
}
