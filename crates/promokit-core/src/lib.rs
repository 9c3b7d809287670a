//! promokit-core: cross-promotion catalog loading with offline fallback.
//!
//! The pieces, leaf first:
//! - [`models`]: catalog payload types
//! - [`api`]: single-shot catalog fetching over HTTP
//! - [`cache`]: 24-hour persistent catalog cache
//! - [`service`]: the `PromoService` that ties them together

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod service;

pub use api::{CatalogSource, FetchError, HttpCatalogClient};
pub use cache::{CacheManager, CacheStatus, FileStore, KeyValueStore, MemoryStore};
pub use config::{PromoConfig, Settings};
pub use models::{Catalog, Icon, Language, LocalizedText, PromoApp, PromoEvent};
pub use service::{
    EventSink, LoadSource, PresentError, PromoService, PromoSnapshot, StorePresenter, TracingSink,
};
