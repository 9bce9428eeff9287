//! Periodic cascade refresh.
//!
//! [`CascadeWatcher`] runs as a background task, refreshing a
//! [`ProductStore`] on a fixed interval so design decisions made by admins
//! reach the vendor's products without a manual reload.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::product_store::ProductStore;

pub struct CascadeWatcher {
    store: Arc<ProductStore>,
    interval: Duration,
}

impl CascadeWatcher {
    pub fn new(store: Arc<ProductStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run the refresh loop.
    ///
    /// The first refresh happens immediately. Failed refreshes are logged and
    /// retried on the next tick. The loop exits when `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Cascade watcher cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.store.refresh().await {
                        Ok(report) if !report.changes.is_empty() => {
                            tracing::info!(changes = report.changes.len(), "Cascade refresh applied changes");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Cascade refresh failed"),
                    }
                }
            }
        }
    }
}
