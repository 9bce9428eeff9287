//! Background services started from configuration.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{payload, Harness};
use vendora_core::placement::DesignTransform;
use vendora_core::product::{PostValidationAction, ProductStatus};
use vendora_studio::collaborators::VendorCatalog;
use vendora_studio::config::StudioConfig;
use vendora_studio::memory::InMemoryTransformStorage;
use vendora_studio::runtime::StudioRuntime;

fn config() -> StudioConfig {
    StudioConfig {
        transform_flush_debounce: Duration::from_millis(200),
        cascade_refresh_interval: Duration::from_secs(10),
        ..StudioConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Test: the watcher refreshes on the configured interval
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn watcher_follows_configured_interval() {
    let h = Harness::new();
    let created = h
        .catalog
        .create_vendor_product(payload("Tee", b"art", PostValidationAction::ToDraft))
        .await
        .unwrap();
    let storage = Arc::new(InMemoryTransformStorage::new());
    let runtime = StudioRuntime::start(&config(), h.catalog.clone(), storage, h.clock.clone());

    // First refresh runs immediately and loads the product.
    tokio::time::sleep(Duration::from_millis(1)).await;
    let status = || async { runtime.store.get(created.product_id).await.map(|p| p.status) };
    assert_eq!(status().await, Some(ProductStatus::Pending));

    h.tick();
    h.catalog.validate_design(created.design_id).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(status().await, Some(ProductStatus::Pending));

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(status().await, Some(ProductStatus::Draft));

    runtime.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: transforms flush after the configured debounce and on shutdown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transforms_flush_after_configured_debounce() {
    let h = Harness::new();
    let storage = Arc::new(InMemoryTransformStorage::new());
    let runtime = StudioRuntime::start(&config(), h.catalog.clone(), storage.clone(), h.clock.clone());

    runtime.transforms.set(7, 0, DesignTransform::with_scale(0.5));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(storage.save_count(), 0);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(storage.save_count(), 1);

    runtime.transforms.set(7, 1, DesignTransform::with_scale(0.3));
    runtime.shutdown().await;
    assert_eq!(storage.save_count(), 2);
    assert_eq!(storage.saved(7).unwrap().len(), 2);
}
