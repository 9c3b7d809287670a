//! Promo service: load orchestration and event handling.
//!
//! `PromoService` loads the catalog with a three-tier fallback
//! (network, then a valid cache, then an empty list with the network
//! error), filters it for the host app, and reports impressions and taps
//! to the host's `EventSink`.

pub mod filter;
pub mod presenter;
pub mod promo;
pub mod sink;
pub mod tier;

pub use filter::filter_apps;
pub use presenter::{PresentError, StorePresenter};
pub use promo::{PromoService, PromoSnapshot};
pub use sink::{EventSink, TracingSink};
pub use tier::{LoadResult, LoadSource, TierOutcome};
