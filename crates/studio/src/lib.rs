//! Vendora studio: the stateful layer around `vendora-core`.
//!
//! - [`product_store::ProductStore`] holds one vendor's products, routes
//!   lifecycle actions through the [`collaborators::VendorCatalog`], and runs
//!   the design cascade on refresh.
//! - [`transform_buffer::TransformBuffer`] keeps placement transforms as a
//!   dirty set flushed to [`collaborators::TransformStorage`], with a
//!   debounced [`transform_buffer::FlushScheduler`].
//! - [`watcher::CascadeWatcher`] refreshes the store periodically.
//! - [`runtime::StudioRuntime`] wires the above from a
//!   [`config::StudioConfig`] and runs the background tasks.
//! - [`memory`] provides in-process collaborators for tests and the
//!   snapshot reconcile tool.

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod memory;
pub mod product_store;
pub mod runtime;
pub mod transform_buffer;
pub mod watcher;

pub use error::{ActionResult, StudioError, StudioResult};
