//! Background services of a running studio.
//!
//! [`StudioRuntime::start`] builds the event bus, the product store and the
//! transform buffer from a [`StudioConfig`], then spawns the cascade watcher
//! and the debounced flush scheduler. [`StudioRuntime::shutdown`] cancels
//! both and waits for the final flush.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vendora_events::EventBus;

use crate::clock::Clock;
use crate::collaborators::{TransformStorage, VendorCatalog};
use crate::config::StudioConfig;
use crate::product_store::ProductStore;
use crate::transform_buffer::{FlushScheduler, TransformBuffer};
use crate::watcher::CascadeWatcher;

/// How long shutdown waits for each background task.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct StudioRuntime {
    pub events: Arc<EventBus>,
    pub store: Arc<ProductStore>,
    pub transforms: Arc<TransformBuffer>,
    cancel: CancellationToken,
    watcher_handle: JoinHandle<()>,
    flush_handle: JoinHandle<()>,
}

impl StudioRuntime {
    /// Wire the studio and spawn its background tasks on the current runtime.
    pub fn start(
        config: &StudioConfig,
        catalog: Arc<dyn VendorCatalog>,
        storage: Arc<dyn TransformStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let events = Arc::new(EventBus::new(config.event_bus_capacity));
        let store = Arc::new(ProductStore::new(catalog, Arc::clone(&events), clock));
        let transforms = Arc::new(TransformBuffer::new(storage));
        let cancel = CancellationToken::new();

        let watcher = CascadeWatcher::new(Arc::clone(&store), config.cascade_refresh_interval);
        let watcher_cancel = cancel.clone();
        let watcher_handle = tokio::spawn(async move {
            watcher.run(watcher_cancel).await;
        });

        let scheduler = FlushScheduler::new(Arc::clone(&transforms), config.transform_flush_debounce);
        let flush_cancel = cancel.clone();
        let flush_handle = tokio::spawn(async move {
            scheduler.run(flush_cancel).await;
        });

        tracing::info!(
            refresh_interval_secs = config.cascade_refresh_interval.as_secs(),
            flush_debounce_ms = config.transform_flush_debounce.as_millis() as u64,
            "Studio background services started"
        );

        Self {
            events,
            store,
            transforms,
            cancel,
            watcher_handle,
            flush_handle,
        }
    }

    /// Stop the watcher, flush pending transforms and wait for both tasks.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.watcher_handle).await.is_err() {
            tracing::warn!("Cascade watcher did not stop in time");
        }
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.flush_handle).await.is_err() {
            tracing::warn!("Flush scheduler did not stop in time");
        }
        tracing::info!("Studio background services stopped");
    }
}
