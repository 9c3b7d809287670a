use crate::api::FetchError;
use crate::models::{Catalog, PromoApp};

use super::filter_apps;

/// Where the apps of a successful load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Network,
    Cache,
}

/// Result of walking the fallback tiers once.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// Tier 1: the network returned a catalog.
    Network(Catalog),
    /// Tier 2: the network failed but the cache held a valid catalog.
    Cache {
        catalog: Catalog,
        network_error: FetchError,
    },
    /// Tier 3: the network failed and the cache missed.
    Empty(FetchError),
}

/// What a load leaves behind in the service state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub apps: Vec<PromoApp>,
    /// Replacement catalog; `None` keeps the previous one.
    pub catalog: Option<Catalog>,
    pub error: Option<FetchError>,
    pub source: Option<LoadSource>,
}

impl TierOutcome {
    pub fn source(&self) -> Option<LoadSource> {
        match self {
            TierOutcome::Network(_) => Some(LoadSource::Network),
            TierOutcome::Cache { .. } => Some(LoadSource::Cache),
            TierOutcome::Empty(_) => None,
        }
    }

    /// Turn the outcome into state for the host app `current_app_id`.
    ///
    /// A cache hit masks the network error; only Tier 3 surfaces it.
    pub fn resolve(self, current_app_id: &str) -> LoadResult {
        let source = self.source();
        match self {
            TierOutcome::Network(catalog) | TierOutcome::Cache { catalog, .. } => LoadResult {
                apps: filter_apps(&catalog, current_app_id),
                catalog: Some(catalog),
                error: None,
                source,
            },
            TierOutcome::Empty(error) => LoadResult {
                apps: Vec::new(),
                catalog: None,
                error: Some(error),
                source,
            },
        }
    }
}
