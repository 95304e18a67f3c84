//! TTL-based caching for upstream data and built reports.
//!
//! This module provides a domain-agnostic store that:
//! - Maps string keys to typed values with per-entry expiry
//! - Bounds total size with soonest-expiry eviction
//! - Tracks hit/miss counts per store
//! - Supports `*`/`?` glob invalidation over prefixed keys
//! - Sweeps expired entries in the background

mod registry;
mod store;

pub use registry::{CacheRegistry, SweeperHandle};
pub use store::{CacheStats, CacheStore};
