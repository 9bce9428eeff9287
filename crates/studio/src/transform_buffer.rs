//! Pending placement writes.
//!
//! [`TransformBuffer`] keeps every product's transforms in memory and tracks
//! which products changed since their last save. [`TransformBuffer::flush`]
//! writes the dirty set out and can be called directly; [`FlushScheduler`]
//! calls it once edits have been quiet for the debounce period.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use vendora_core::placement::{DesignTransform, TransformMap};
use vendora_core::types::DbId;

use crate::collaborators::TransformStorage;
use crate::error::StudioResult;

#[derive(Default)]
struct BufferState {
    transforms: HashMap<DbId, TransformMap>,
    dirty: BTreeSet<DbId>,
}

pub struct TransformBuffer {
    storage: Arc<dyn TransformStorage>,
    state: Mutex<BufferState>,
    changed: Notify,
}

impl TransformBuffer {
    pub fn new(storage: Arc<dyn TransformStorage>) -> Self {
        Self {
            storage,
            state: Mutex::new(BufferState::default()),
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mark_dirty(&self, state: &mut BufferState, product_id: DbId) {
        state.dirty.insert(product_id);
        self.changed.notify_one();
    }

    /// Record one zone's transform and mark the product dirty.
    pub fn set(&self, product_id: DbId, zone_index: usize, transform: DesignTransform) {
        let mut state = self.lock();
        state
            .transforms
            .entry(product_id)
            .or_default()
            .insert(zone_index, transform);
        self.mark_dirty(&mut state, product_id);
    }

    /// Record several zones at once, e.g. a session's pending changes.
    pub fn set_many(&self, product_id: DbId, transforms: TransformMap) {
        if transforms.is_empty() {
            return;
        }
        let mut state = self.lock();
        state.transforms.entry(product_id).or_default().extend(transforms);
        self.mark_dirty(&mut state, product_id);
    }

    pub fn get(&self, product_id: DbId) -> TransformMap {
        self.lock()
            .transforms
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Transforms of `product_id`, from memory when already held, otherwise
    /// from storage.
    pub async fn load(&self, product_id: DbId) -> StudioResult<TransformMap> {
        let held = self.lock().transforms.get(&product_id).cloned();
        if let Some(held) = held {
            return Ok(held);
        }
        let stored = self.storage.load_transforms(product_id).await?;
        let mut state = self.lock();
        // An edit may have landed while storage was answering.
        let held = state.transforms.entry(product_id).or_insert(stored);
        Ok(held.clone())
    }

    /// Replace every transform of `product_id` with `defaults` and mark it
    /// dirty so the reset is persisted.
    pub fn reset(&self, product_id: DbId, defaults: TransformMap) {
        let mut state = self.lock();
        state.transforms.insert(product_id, defaults);
        self.mark_dirty(&mut state, product_id);
        tracing::debug!(product_id, "Transforms reset to defaults");
    }

    pub fn is_dirty(&self, product_id: DbId) -> bool {
        self.lock().dirty.contains(&product_id)
    }

    pub fn dirty_count(&self) -> usize {
        self.lock().dirty.len()
    }

    /// Write every dirty product to storage.
    ///
    /// Products that fail to save stay dirty; the first error is returned
    /// after every product has been attempted.
    pub async fn flush(&self) -> StudioResult<usize> {
        let pending: Vec<(DbId, TransformMap)> = {
            let mut state = self.lock();
            let dirty = std::mem::take(&mut state.dirty);
            dirty
                .into_iter()
                .map(|id| (id, state.transforms.get(&id).cloned().unwrap_or_default()))
                .collect()
        };

        let mut saved = 0;
        let mut first_error = None;
        for (product_id, transforms) in pending {
            match self.storage.save_transforms(product_id, &transforms).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    tracing::error!(product_id, error = %e, "Failed to save transforms");
                    self.lock().dirty.insert(product_id);
                    first_error.get_or_insert(e);
                }
            }
        }

        if saved > 0 {
            tracing::debug!(saved, "Transforms flushed");
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(saved),
        }
    }

    /// Save one product immediately, whether dirty or not.
    pub async fn save_now(&self, product_id: DbId) -> StudioResult<()> {
        let transforms = {
            let mut state = self.lock();
            state.dirty.remove(&product_id);
            state.transforms.get(&product_id).cloned().unwrap_or_default()
        };
        if let Err(e) = self.storage.save_transforms(product_id, &transforms).await {
            self.lock().dirty.insert(product_id);
            return Err(e);
        }
        Ok(())
    }

    /// Resolves after the next change to the buffer.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }
}

// ---------------------------------------------------------------------------
// FlushScheduler
// ---------------------------------------------------------------------------

/// Background task that flushes a [`TransformBuffer`] once edits have been
/// quiet for `debounce`.
pub struct FlushScheduler {
    buffer: Arc<TransformBuffer>,
    debounce: Duration,
}

impl FlushScheduler {
    pub fn new(buffer: Arc<TransformBuffer>, debounce: Duration) -> Self {
        Self { buffer, debounce }
    }

    /// Run until `cancel` fires, then flush whatever is still dirty.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.buffer.changed() => {}
            }

            // Every further edit restarts the quiet period.
            let cancelled = loop {
                tokio::select! {
                    _ = cancel.cancelled() => break true,
                    _ = self.buffer.changed() => continue,
                    _ = tokio::time::sleep(self.debounce) => break false,
                }
            };
            if cancelled {
                break;
            }

            if let Err(e) = self.buffer.flush().await {
                tracing::error!(error = %e, "Debounced transform flush failed");
            }
        }

        tracing::info!("Flush scheduler cancelled");
        if let Err(e) = self.buffer.flush().await {
            tracing::error!(error = %e, "Final transform flush failed");
        }
    }
}
