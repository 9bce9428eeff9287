//! In-process collaborators.
//!
//! [`InMemoryCatalog`] behaves like the remote catalog: it enforces the same
//! publication rules, deduplicates uploads, and exposes admin hooks to
//! validate or reject designs. Failures can be injected with
//! [`InMemoryCatalog::fail_next`] to exercise network error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use vendora_core::cascade::refresh_and_cascade;
use vendora_core::design::{
    probe_design_size, Design, DesignRegistry, DesignValidation, DesignValidationStatus,
};
use vendora_core::error::CoreError;
use vendora_core::placement::TransformMap;
use vendora_core::product::{
    BaseProductRef, CreateProductPayload, CreatedProduct, DesignSource, PostValidationAction,
    ProductWorkflow, VendorProduct,
};
use vendora_core::publication::{self, apply_design_validation, initial_status};
use vendora_core::types::{DbId, Timestamp};

use crate::clock::Clock;
use crate::collaborators::{ProductFilters, TransformStorage, VendorCatalog};
use crate::error::{StudioError, StudioResult};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CatalogState {
    products: BTreeMap<DbId, VendorProduct>,
    designs: HashMap<DbId, Design>,
    registry: DesignRegistry,
    base_products: HashMap<DbId, BaseProductRef>,
    next_product_id: DbId,
    next_design_id: DbId,
    fail_next: Option<String>,
}

impl CatalogState {
    fn take_failure(&mut self) -> Result<(), CoreError> {
        match self.fail_next.take() {
            Some(message) => Err(CoreError::Network(message)),
            None => Ok(()),
        }
    }

    fn product(&self, id: DbId) -> Result<&VendorProduct, CoreError> {
        self.products.get(&id).ok_or(CoreError::NotFound {
            entity: "VendorProduct",
            id,
        })
    }

    fn design(&self, id: DbId) -> Result<&Design, CoreError> {
        self.designs.get(&id).ok_or(CoreError::NotFound {
            entity: "Design",
            id,
        })
    }

    fn design_mut(&mut self, id: DbId) -> Result<&mut Design, CoreError> {
        self.designs.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Design",
            id,
        })
    }

    fn cascade(&mut self, design_id: DbId, now: Timestamp) -> Result<usize, CoreError> {
        let validation = self.design(design_id)?.validation();
        Ok(self.apply(&HashMap::from([(design_id, validation)]), now))
    }

    fn apply(&mut self, designs: &HashMap<DbId, DesignValidation>, now: Timestamp) -> usize {
        let products: Vec<VendorProduct> = self.products.values().cloned().collect();
        let outcome = refresh_and_cascade(&products, designs, now);
        for product in outcome.products {
            self.products.insert(product.id, product);
        }
        outcome.changes.len()
    }
}

/// A vendor catalog held entirely in memory.
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCatalog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CatalogState {
                next_product_id: 1,
                next_design_id: 1,
                ..CatalogState::default()
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load existing products and designs. Id counters continue after the
    /// largest seeded ids.
    pub fn seed(&self, products: Vec<VendorProduct>, designs: Vec<Design>) {
        let mut state = self.lock();
        for design in designs {
            state.next_design_id = state.next_design_id.max(design.id + 1);
            state.designs.insert(design.id, design);
        }
        for product in products {
            state.next_product_id = state.next_product_id.max(product.id + 1);
            if let Some(base) = &product.base_product {
                state.base_products.entry(base.id).or_insert_with(|| base.clone());
            }
            state.products.insert(product.id, product);
        }
    }

    pub fn add_base_product(&self, base: BaseProductRef) {
        self.lock().base_products.insert(base.id, base);
    }

    /// Make the next catalog call fail with a network error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    pub fn product(&self, id: DbId) -> Option<VendorProduct> {
        self.lock().products.get(&id).cloned()
    }

    pub fn design(&self, id: DbId) -> Option<Design> {
        self.lock().designs.get(&id).cloned()
    }

    /// Admin approval of a design. Dependent products move at once, the way
    /// the server applies a decision; returns how many moved.
    pub fn validate_design(&self, design_id: DbId) -> Result<usize, CoreError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let design = state.design_mut(design_id)?;
        design.is_validated = true;
        design.validation_status = DesignValidationStatus::Validated;
        design.rejection_reason = None;
        design.validated_at = Some(now);
        let moved = state.cascade(design_id, now)?;
        tracing::info!(design_id, moved, "Design validated");
        Ok(moved)
    }

    /// Admin rejection of a design, cascaded like [`validate_design`](Self::validate_design).
    pub fn reject_design(&self, design_id: DbId, reason: impl Into<String>) -> Result<usize, CoreError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let design = state.design_mut(design_id)?;
        design.is_validated = false;
        design.validation_status = DesignValidationStatus::Rejected;
        design.rejection_reason = Some(reason.into());
        design.validated_at = None;
        let moved = state.cascade(design_id, now)?;
        tracing::info!(design_id, moved, "Design rejected");
        Ok(moved)
    }

    /// Apply every design's current state to the stored products. Seeded
    /// snapshots may hold decisions the products have not caught up with.
    pub fn apply_design_decisions(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        let designs: HashMap<DbId, DesignValidation> = state
            .designs
            .values()
            .map(|d| (d.id, d.validation()))
            .collect();
        let moved = state.apply(&designs, now);
        tracing::info!(moved, "Design decisions applied");
        moved
    }
}

#[async_trait]
impl VendorCatalog for InMemoryCatalog {
    async fn fetch_vendor_products(
        &self,
        filters: &ProductFilters,
    ) -> Result<Vec<VendorProduct>, CoreError> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state
            .products
            .values()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }

    async fn update_post_validation_action(
        &self,
        product_id: DbId,
        action: PostValidationAction,
    ) -> Result<VendorProduct, CoreError> {
        let now = self.clock.now();
        let mut state = self.lock();
        state.take_failure()?;
        let next = publication::update_post_validation_action(state.product(product_id)?, action, now)?;
        state.products.insert(product_id, next.clone());
        Ok(next)
    }

    async fn publish_draft(&self, product_id: DbId) -> Result<VendorProduct, CoreError> {
        let now = self.clock.now();
        let mut state = self.lock();
        state.take_failure()?;
        let next = publication::publish_draft(state.product(product_id)?, now)?;
        state.products.insert(product_id, next.clone());
        Ok(next)
    }

    async fn create_vendor_product(
        &self,
        payload: CreateProductPayload,
    ) -> Result<CreatedProduct, CoreError> {
        let now = self.clock.now();
        let mut state = self.lock();
        state.take_failure()?;

        let base = state
            .base_products
            .get(&payload.base_product_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "BaseProduct",
                id: payload.base_product_id,
            })?;
        vendora_core::product::validate_create_payload(&payload, base.price)?;
        let status = initial_status(payload.forced_status)?;

        let (design_id, is_design_reused) = match &payload.design {
            DesignSource::Existing { design_id } => {
                state.design(*design_id)?;
                (*design_id, true)
            }
            DesignSource::Upload { name, image } => {
                let candidate = state.next_design_id;
                let registration = state.registry.register(image, candidate);
                if !registration.is_design_reused {
                    let natural_size = match probe_design_size(image) {
                        Ok(size) => Some(size),
                        Err(e) => {
                            tracing::warn!(design_id = candidate, error = %e, "Design size unreadable");
                            None
                        }
                    };
                    state.next_design_id += 1;
                    state.designs.insert(
                        candidate,
                        Design {
                            id: candidate,
                            name: name.clone(),
                            image_url: format!("memory://designs/{candidate}"),
                            is_validated: false,
                            validation_status: DesignValidationStatus::Pending,
                            rejection_reason: None,
                            validated_at: None,
                            natural_size,
                        },
                    );
                }
                (registration.design_id, registration.is_design_reused)
            }
        };

        let product_id = state.next_product_id;
        state.next_product_id += 1;

        let mut product = VendorProduct {
            id: product_id,
            vendor_name: payload.vendor_name,
            vendor_description: payload.vendor_description,
            vendor_price: payload.vendor_price,
            vendor_stock: payload.vendor_stock,
            status,
            is_validated: false,
            post_validation_action: payload.post_validation_action,
            workflow: ProductWorkflow::Cascade,
            created_at: now,
            updated_at: now,
            validated_at: None,
            published_at: None,
            design_id: Some(design_id),
            base_product: Some(base),
        };

        // A reused design may already be approved.
        let validation = state.design(design_id)?.validation();
        if validation.is_validated {
            product = apply_design_validation(&product, &validation, now);
        }
        let status = product.status;
        state.products.insert(product_id, product);

        tracing::info!(product_id, design_id, is_design_reused, "Vendor product created");

        let message = if is_design_reused {
            "Product created with an existing design"
        } else {
            "Product created, design submitted for review"
        };
        Ok(CreatedProduct {
            product_id,
            design_id,
            is_design_reused,
            status,
            message: message.to_string(),
        })
    }

    async fn refresh_all_products(&self) -> Result<Vec<VendorProduct>, CoreError> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state.products.values().cloned().collect())
    }

    async fn get_design_validation_status(
        &self,
        design_id: DbId,
    ) -> Result<DesignValidation, CoreError> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state.design(design_id)?.validation())
    }
}

// ---------------------------------------------------------------------------
// Transform storage
// ---------------------------------------------------------------------------

/// Transform storage backed by a map, counting writes.
#[derive(Default)]
pub struct InMemoryTransformStorage {
    saved: Mutex<HashMap<DbId, TransformMap>>,
    save_count: AtomicUsize,
    fail_next: Mutex<Option<String>>,
}

impl InMemoryTransformStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save_transforms` calls so far.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn saved(&self, product_id: DbId) -> Option<TransformMap> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&product_id)
            .cloned()
    }

    /// Make the next save fail.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }
}

#[async_trait]
impl TransformStorage for InMemoryTransformStorage {
    async fn save_transforms(&self, product_id: DbId, transforms: &TransformMap) -> StudioResult<()> {
        if let Some(message) = self.fail_next.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(StudioError::Storage(message));
        }
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(product_id, transforms.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_transforms(&self, product_id: DbId) -> StudioResult<TransformMap> {
        Ok(self.saved(product_id).unwrap_or_default())
    }
}
