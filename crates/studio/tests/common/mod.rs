#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use vendora_core::product::{BaseProductRef, CreateProductPayload, DesignSource, PostValidationAction};
use vendora_core::types::Timestamp;
use vendora_events::EventBus;
pub use vendora_events::drain;
use vendora_studio::clock::{Clock, ManualClock};
use vendora_studio::memory::InMemoryCatalog;
use vendora_studio::product_store::ProductStore;

pub const BASE_PRODUCT_ID: i64 = 1;
pub const BASE_PRICE: i64 = 1500;

/// Store wired to an in-memory catalog and a pinned clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub catalog: Arc<InMemoryCatalog>,
    pub events: Arc<EventBus>,
    pub store: Arc<ProductStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_bus_capacity(vendora_events::bus::DEFAULT_CAPACITY)
    }

    pub fn with_bus_capacity(capacity: usize) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let catalog = Arc::new(InMemoryCatalog::new(clock.clone()));
        catalog.add_base_product(BaseProductRef {
            id: BASE_PRODUCT_ID,
            name: "Classic tee".to_string(),
            price: BASE_PRICE,
        });
        let events = Arc::new(EventBus::new(capacity));
        let store = Arc::new(ProductStore::new(catalog.clone(), events.clone(), clock.clone()));
        Self {
            clock,
            catalog,
            events,
            store,
        }
    }

    /// Move time forward so later writes are strictly newer.
    pub fn tick(&self) {
        self.clock.advance(Duration::hours(1));
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Create a product through the store and return its id and design id.
    pub async fn create(&self, payload: CreateProductPayload) -> (i64, i64) {
        let result = self.store.create_product(payload, BASE_PRICE).await;
        assert!(result.success, "create failed: {}", result.message);
        let created = result.data.expect("created product");
        (created.product_id, created.design_id)
    }
}

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

pub fn payload(name: &str, image: &[u8], action: PostValidationAction) -> CreateProductPayload {
    CreateProductPayload {
        base_product_id: BASE_PRODUCT_ID,
        vendor_name: name.to_string(),
        vendor_description: "Soft cotton".to_string(),
        vendor_price: 2500,
        vendor_stock: 20,
        selected_color_ids: vec![1, 2],
        selected_sizes: vec!["S".to_string(), "M".to_string()],
        design: DesignSource::Upload {
            name: format!("{name} artwork"),
            image: image.to_vec(),
        },
        post_validation_action: action,
        forced_status: None,
    }
}

