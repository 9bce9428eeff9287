//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the product store, the
//! cascade watcher, and whatever renders notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use vendora_core::cascade::CascadeChange;
use vendora_core::product::PostValidationAction;
use vendora_core::types::DbId;

// ---------------------------------------------------------------------------
// StudioEvent
// ---------------------------------------------------------------------------

/// Something that happened to a vendor's products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum StudioEvent {
    /// A refresh moved a product (design cascade or server-side update).
    ProductTransitioned {
        change: CascadeChange,
        at: DateTime<Utc>,
    },
    /// A draft was published by the vendor.
    DraftPublished {
        product_id: DbId,
        product_name: String,
        was_validated: bool,
        at: DateTime<Utc>,
    },
    /// A pending product's post-validation action was changed.
    ActionUpdated {
        product_id: DbId,
        action: PostValidationAction,
        at: DateTime<Utc>,
    },
    /// A product was created.
    ProductCreated {
        product_id: DbId,
        design_id: DbId,
        is_design_reused: bool,
        at: DateTime<Utc>,
    },
    /// A collaborator call failed; `message` is surfaced verbatim.
    OperationFailed {
        operation: String,
        product_id: Option<DbId>,
        message: String,
        at: DateTime<Utc>,
    },
}

impl StudioEvent {
    /// Dot-separated event name, for logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProductTransitioned { .. } => "product.transitioned",
            Self::DraftPublished { .. } => "product.published",
            Self::ActionUpdated { .. } => "product.action_updated",
            Self::ProductCreated { .. } => "product.created",
            Self::OperationFailed { .. } => "operation.failed",
        }
    }

    /// Product the event is about, if any.
    pub fn product_id(&self) -> Option<DbId> {
        match self {
            Self::ProductTransitioned { change, .. } => Some(change.product_id),
            Self::DraftPublished { product_id, .. }
            | Self::ActionUpdated { product_id, .. }
            | Self::ProductCreated { product_id, .. } => Some(*product_id),
            Self::OperationFailed { product_id, .. } => *product_id,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events a lagging subscriber may fall behind by before it starts missing them.
pub const DEFAULT_CAPACITY: usize = 256;

/// Studio-wide event fan-out.
///
/// Every subscriber sees every event published after it subscribed. A
/// subscriber that falls more than `capacity` events behind gets
/// `RecvError::Lagged` and resumes from the oldest retained event.
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire-and-forget; nothing listening is not an error.
    pub fn publish(&self, event: StudioEvent) {
        tracing::debug!(
            event_type = event.event_type(),
            product_id = ?event.product_id(),
            "Publishing studio event"
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Everything currently buffered on `rx`, without waiting.
///
/// Events lost to lag are logged and skipped; draining continues with the
/// oldest event still retained.
pub fn drain(rx: &mut broadcast::Receiver<StudioEvent>) -> Vec<StudioEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Event subscriber lagged, some events were dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    events
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn published(product_id: DbId) -> StudioEvent {
        StudioEvent::DraftPublished {
            product_id,
            product_name: "Tee".to_string(),
            was_validated: false,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(published(42));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type(), "product.published");
        assert_eq!(received.product_id(), Some(42));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(published(1));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(published(1));
        assert_eq!(bus.subscriber_count(), 0);

        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(published(2));
        assert_eq!(rx.recv().await.unwrap().product_id(), Some(2));
    }

    #[test]
    fn drain_skips_past_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 1..=3 {
            bus.publish(published(id));
        }
        let ids: Vec<_> = drain(&mut rx).iter().map(StudioEvent::product_id).collect();
        assert_eq!(ids, vec![Some(2), Some(3)]);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 1..=3 {
            bus.publish(published(id));
        }
        assert_matches::assert_matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        );
        assert_eq!(rx.recv().await.unwrap().product_id(), Some(2));
    }

    #[test]
    fn failure_without_product_has_no_id() {
        let event = StudioEvent::OperationFailed {
            operation: "refresh".to_string(),
            product_id: None,
            message: "timeout".to_string(),
            at: Utc::now(),
        };
        assert_eq!(event.product_id(), None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "operation_failed");
    }
}
