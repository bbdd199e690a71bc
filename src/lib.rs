//! Cloudflare cache purging for wiki content-invalidation events
//!
//! Collects the absolute URLs affected when a file, thumbnail set, or page is
//! purged on a wiki, then asks the Cloudflare API to evict them from its cache.

pub mod app;
pub mod cdn;
pub mod collector;
pub mod error;
pub mod host;
pub mod models;

pub use error::{Error, Result};
