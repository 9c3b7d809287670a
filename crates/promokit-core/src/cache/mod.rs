//! Local caching module for offline catalog access.
//!
//! This module provides the `CacheManager`, which keeps at most one
//! catalog record in a `KeyValueStore` together with its write time.
//! A record is valid for 24 hours; expired or unreadable records are
//! evicted the next time they are read.
//!
//! Backends:
//! - `FileStore`: one file per key, written atomically via rename
//! - `MemoryStore`: process-local map for tests and ephemeral callers

pub mod error;
pub mod manager;
pub mod store;

pub use error::{CacheError, StoreError};
pub use manager::{CacheManager, CacheStatus, CACHE_TTL, CATALOG_KEY, TIMESTAMP_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
