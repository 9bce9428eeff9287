//! Vendora studio event bus and notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StudioEvent`]: what happened to a vendor's products (cascade
//!   transitions, publish and action updates, failures).
//! - [`Toast`]: transient user-facing notification rendered from an event.

pub mod bus;
pub mod toast;

pub use bus::{drain, EventBus, StudioEvent};
pub use toast::{Toast, ToastLevel};
