//! Character catalog aggregation.
//!
//! Characters come from two sources: the local custom-character store
//! and a public remote catalog. This crate merges them behind one read
//! surface and applies the viewer's age gate on every path, so handlers
//! never re-implement gating rules.

pub mod cache;
pub mod remote;
pub mod service;
pub mod view;

pub use remote::{RemoteCatalog, RetryPolicy};
pub use service::CatalogService;
