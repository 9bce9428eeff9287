//! Boundaries to the outside world.
//!
//! The store never talks to HTTP or storage directly; it goes through these
//! traits so the same logic runs against a remote catalog or the in-memory
//! implementations in [`crate::memory`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vendora_core::design::DesignValidation;
use vendora_core::error::CoreError;
use vendora_core::placement::TransformMap;
use vendora_core::product::{
    CreateProductPayload, CreatedProduct, PostValidationAction, ProductStatus, VendorProduct,
};
use vendora_core::types::DbId;

use crate::error::StudioResult;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Narrowing applied when listing a vendor's products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub design_id: Option<DbId>,
    /// Case-insensitive substring of the vendor name.
    #[serde(default)]
    pub search: Option<String>,
}

impl ProductFilters {
    pub fn matches(&self, product: &VendorProduct) -> bool {
        if self.status.is_some_and(|s| s != product.status) {
            return false;
        }
        if self.design_id.is_some() && self.design_id != product.design_id {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => product
                .vendor_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The product and design service a vendor works against.
///
/// Every method may fail with [`CoreError::Network`]; its message is shown to
/// the vendor verbatim.
#[async_trait]
pub trait VendorCatalog: Send + Sync {
    async fn fetch_vendor_products(
        &self,
        filters: &ProductFilters,
    ) -> Result<Vec<VendorProduct>, CoreError>;

    async fn update_post_validation_action(
        &self,
        product_id: DbId,
        action: PostValidationAction,
    ) -> Result<VendorProduct, CoreError>;

    /// Publish a draft and return the stored product.
    async fn publish_draft(&self, product_id: DbId) -> Result<VendorProduct, CoreError>;

    async fn create_vendor_product(
        &self,
        payload: CreateProductPayload,
    ) -> Result<CreatedProduct, CoreError>;

    /// Re-fetch every product of the vendor. Design decisions the catalog
    /// has not applied yet are reconciled by the caller.
    async fn refresh_all_products(&self) -> Result<Vec<VendorProduct>, CoreError>;

    async fn get_design_validation_status(
        &self,
        design_id: DbId,
    ) -> Result<DesignValidation, CoreError>;
}

// ---------------------------------------------------------------------------
// Transform persistence
// ---------------------------------------------------------------------------

/// Where placement transforms are kept between sessions.
#[async_trait]
pub trait TransformStorage: Send + Sync {
    /// Replace every stored transform of `product_id`.
    async fn save_transforms(&self, product_id: DbId, transforms: &TransformMap) -> StudioResult<()>;

    /// Stored transforms of `product_id`; empty when nothing was saved.
    async fn load_transforms(&self, product_id: DbId) -> StudioResult<TransformMap>;
}
