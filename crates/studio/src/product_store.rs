//! Per-vendor product store.
//!
//! [`ProductStore`] owns the in-memory product list. Lifecycle actions are
//! checked locally against the publication state machine, sent to the
//! catalog, and the stored result replaces the local copy. `refresh` pulls
//! the catalog again, merges it over local state and runs the design
//! cascade. Every outcome is announced on the [`EventBus`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use vendora_core::cascade::{diff_products, merge_refreshed, refresh_and_cascade, CascadeChange};
use vendora_core::error::CoreError;
use vendora_core::product::{
    validate_create_payload, CreateProductPayload, CreatedProduct, PostValidationAction,
    VendorProduct,
};
use vendora_core::publication;
use vendora_core::stats::{compute_stats, ProductStats};
use vendora_core::types::DbId;
use vendora_events::{EventBus, StudioEvent};

use crate::clock::Clock;
use crate::collaborators::{ProductFilters, VendorCatalog};
use crate::error::{ActionResult, StudioResult};

/// What a refresh changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    /// Moves already made by the catalog first, then transitions applied
    /// locally, each in product order.
    pub changes: Vec<CascadeChange>,
    pub stats: ProductStats,
}

pub struct ProductStore {
    catalog: Arc<dyn VendorCatalog>,
    events: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    filters: ProductFilters,
    products: RwLock<Vec<VendorProduct>>,
}

impl ProductStore {
    pub fn new(catalog: Arc<dyn VendorCatalog>, events: Arc<EventBus>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            events,
            clock,
            filters: ProductFilters::default(),
            products: RwLock::new(Vec::new()),
        }
    }

    /// Restrict the store to products matching `filters`.
    pub fn with_filters(mut self, filters: ProductFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // ---- Reads ----

    pub async fn products(&self) -> Vec<VendorProduct> {
        self.products.read().await.clone()
    }

    pub async fn get(&self, product_id: DbId) -> Option<VendorProduct> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
    }

    pub async fn stats(&self) -> ProductStats {
        compute_stats(&self.products.read().await)
    }

    // ---- Catalog round trips ----

    /// Replace local state with the catalog's product list.
    pub async fn load(&self) -> StudioResult<usize> {
        let fetched = match self.catalog.fetch_vendor_products(&self.filters).await {
            Ok(products) => products,
            Err(e) => {
                self.report_failure("load", None, &e);
                return Err(e.into());
            }
        };
        let count = fetched.len();
        *self.products.write().await = fetched;
        tracing::info!(count, "Vendor products loaded");
        Ok(count)
    }

    /// Change what happens to a pending product once its design is validated.
    pub async fn update_post_validation_action(
        &self,
        product_id: DbId,
        action: PostValidationAction,
    ) -> ActionResult<VendorProduct> {
        let Some(local) = self.get(product_id).await else {
            return ActionResult::from_error(&not_found(product_id));
        };
        if let Err(e) = publication::update_post_validation_action(&local, action, self.clock.now()) {
            tracing::warn!(product_id, error = %e, "Post-validation action change refused");
            return ActionResult::from_error(&e);
        }

        match self.catalog.update_post_validation_action(product_id, action).await {
            Ok(updated) => {
                self.replace(updated.clone()).await;
                self.events.publish(StudioEvent::ActionUpdated {
                    product_id,
                    action,
                    at: self.clock.now(),
                });
                let message = match action {
                    PostValidationAction::AutoPublish => {
                        "The product will be published as soon as its design is approved"
                    }
                    PostValidationAction::ToDraft => {
                        "The product will move to your drafts once its design is approved"
                    }
                };
                ActionResult::ok(message, updated)
            }
            Err(e) => {
                self.report_failure("update_post_validation_action", Some(product_id), &e);
                ActionResult::from_error(&e)
            }
        }
    }

    /// Publish a draft, validated or not.
    pub async fn publish_draft(&self, product_id: DbId) -> ActionResult<VendorProduct> {
        let Some(local) = self.get(product_id).await else {
            return ActionResult::from_error(&not_found(product_id));
        };
        if let Err(e) = publication::publish_draft(&local, self.clock.now()) {
            tracing::warn!(product_id, error = %e, "Publish refused");
            return ActionResult::from_error(&e);
        }

        match self.catalog.publish_draft(product_id).await {
            Ok(published) => {
                self.replace(published.clone()).await;
                self.events.publish(StudioEvent::DraftPublished {
                    product_id,
                    product_name: published.vendor_name.clone(),
                    was_validated: local.is_validated,
                    at: self.clock.now(),
                });
                tracing::info!(product_id, was_validated = local.is_validated, "Draft published");
                let message = if local.is_validated {
                    "Product published"
                } else {
                    "Product published before design approval"
                };
                ActionResult::ok(message, published)
            }
            Err(e) => {
                self.report_failure("publish_draft", Some(product_id), &e);
                ActionResult::from_error(&e)
            }
        }
    }

    /// Create a product on the catalog, then refresh so it shows up locally.
    ///
    /// `base_price` is the floor of the chosen base product.
    pub async fn create_product(
        &self,
        payload: CreateProductPayload,
        base_price: i64,
    ) -> ActionResult<CreatedProduct> {
        if let Err(e) = validate_create_payload(&payload, base_price)
            .and_then(|()| publication::initial_status(payload.forced_status).map(|_| ()))
        {
            return ActionResult::from_error(&e);
        }

        let created = match self.catalog.create_vendor_product(payload).await {
            Ok(created) => created,
            Err(e) => {
                self.report_failure("create_product", None, &e);
                return ActionResult::from_error(&e);
            }
        };

        self.events.publish(StudioEvent::ProductCreated {
            product_id: created.product_id,
            design_id: created.design_id,
            is_design_reused: created.is_design_reused,
            at: self.clock.now(),
        });

        if let Err(e) = self.refresh().await {
            tracing::warn!(product_id = created.product_id, error = %e, "Refresh after create failed");
        }

        ActionResult::ok(created.message.clone(), created)
    }

    /// Pull the catalog, merge it over local state, and cascade design
    /// validation onto dependent products.
    ///
    /// Designs whose status cannot be fetched are skipped; their products
    /// stay as they are until the next refresh.
    pub async fn refresh(&self) -> StudioResult<RefreshReport> {
        let refreshed = match self.catalog.refresh_all_products().await {
            Ok(products) => products,
            Err(e) => {
                self.report_failure("refresh", None, &e);
                return Err(e.into());
            }
        };
        let refreshed: Vec<VendorProduct> =
            refreshed.into_iter().filter(|p| self.filters.matches(p)).collect();

        let local = self.products().await;
        let merged = merge_refreshed(&local, refreshed);

        let design_ids: BTreeSet<DbId> = merged
            .iter()
            .filter_map(|p| p.design_id.filter(|&d| p.follows_design(d)))
            .collect();
        let mut designs = HashMap::with_capacity(design_ids.len());
        for design_id in design_ids {
            match self.catalog.get_design_validation_status(design_id).await {
                Ok(validation) => {
                    designs.insert(design_id, validation);
                }
                Err(e) => {
                    tracing::warn!(design_id, error = %e, "Design status unavailable, skipping");
                }
            }
        }

        // Moves the catalog already made, then whatever it has not caught up with.
        let mut changes = diff_products(&local, &merged, &designs);
        let outcome = refresh_and_cascade(&merged, &designs, self.clock.now());
        changes.extend(outcome.changes);

        let stats = {
            let mut products = self.products.write().await;
            // Anything written locally while we were fetching wins again.
            *products = merge_refreshed(&products, outcome.products);
            compute_stats(&products)
        };

        for change in &changes {
            tracing::info!(
                product_id = change.product_id,
                from = %change.previous_status,
                to = %change.status,
                reason = ?change.reason,
                "Product transitioned"
            );
            self.events.publish(StudioEvent::ProductTransitioned {
                change: change.clone(),
                at: self.clock.now(),
            });
        }
        tracing::debug!(changes = changes.len(), total = stats.total, "Refresh complete");

        Ok(RefreshReport { changes, stats })
    }

    // ---- Helpers ----

    async fn replace(&self, product: VendorProduct) {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => products.push(product),
        }
    }

    fn report_failure(&self, operation: &str, product_id: Option<DbId>, error: &CoreError) {
        tracing::error!(operation, product_id = ?product_id, error = %error, "Catalog call failed");
        self.events.publish(StudioEvent::OperationFailed {
            operation: operation.to_string(),
            product_id,
            message: error.to_string(),
            at: self.clock.now(),
        });
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "VendorProduct",
        id,
    }
}
