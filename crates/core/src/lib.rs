//! Vendora domain logic.
//!
//! Everything in this crate is pure: no I/O, no clocks, no async. Callers
//! supply timestamps and pre-loaded collaborator data, and get back updated
//! values plus diffs they can persist or announce.
//!
//! - [`publication`] / [`cascade`] / [`stats`]: the vendor product lifecycle
//!   (`PENDING -> DRAFT -> PUBLISHED`) and design validation fan-out.
//! - [`placement`]: constant-ratio positioning of a design inside the
//!   delimitation zones of a product mockup.

pub mod cascade;
pub mod design;
pub mod error;
pub mod placement;
pub mod product;
pub mod publication;
pub mod stats;
pub mod types;
