//! The promo service.
//!
//! `PromoService` owns the list shown to the user. All state lives behind a
//! single lock and every change is published as a `PromoSnapshot` on a watch
//! channel, so readers never see a half-applied load.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{CatalogSource, FetchError, HttpCatalogClient};
use crate::cache::{CacheManager, FileStore};
use crate::config::{PromoConfig, Settings};
use crate::models::{store_link, Catalog, PromoApp, PromoEvent};

use super::{EventSink, LoadResult, LoadSource, PresentError, StorePresenter, TierOutcome};

/// Point-in-time view of the service state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromoSnapshot {
    /// Filtered apps in catalog order
    pub apps: Vec<PromoApp>,
    pub is_loading: bool,
    /// Set only when the network failed and no valid cache was available
    pub error: Option<FetchError>,
    /// Origin of `apps` after the last completed load
    pub source: Option<LoadSource>,
    /// Store id whose listing could not be presented
    pub overlay_error: Option<String>,
}

#[derive(Default)]
struct PromoState {
    snapshot: PromoSnapshot,
    catalog: Option<Catalog>,
    tracked_impressions: HashSet<String>,
}

pub struct PromoService {
    config: PromoConfig,
    source: Arc<dyn CatalogSource>,
    cache: Arc<CacheManager>,
    state: Mutex<PromoState>,
    updates: watch::Sender<PromoSnapshot>,
    sink: Mutex<Option<Weak<dyn EventSink>>>,
    presenter: Option<Arc<dyn StorePresenter>>,
}

/// Marks a load as in flight. Dropping it before `finish` (for example when
/// the load future is cancelled) clears the loading flag.
struct InFlight<'a> {
    service: &'a PromoService,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, result: LoadResult) {
        self.finished = true;
        self.service.finish_load(result);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Catalog load abandoned before completion");
            let mut state = self.service.state.lock();
            state.snapshot.is_loading = false;
            self.service.publish(&state);
        }
    }
}

impl PromoService {
    pub fn new(config: PromoConfig, source: Arc<dyn CatalogSource>, cache: Arc<CacheManager>) -> Self {
        let (updates, _) = watch::channel(PromoSnapshot::default());
        Self {
            config,
            source,
            cache,
            state: Mutex::new(PromoState::default()),
            updates,
            sink: Mutex::new(None),
            presenter: None,
        }
    }

    /// Service for `current_app_id` using the default catalog URL, the HTTP
    /// client and the on-disk cache.
    pub fn with_app_id(current_app_id: impl Into<String>) -> Result<Self> {
        let settings = Settings {
            app_id: Some(current_app_id.into()),
            ..Settings::default()
        };
        Self::from_settings(&settings)
    }

    /// Service wired to the HTTP client and the on-disk cache described by
    /// `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = settings.promo_config()?;
        let source = HttpCatalogClient::for_deadline(config.fetch_timeout())?;
        let store = FileStore::new(settings.cache_dir()?)?;
        let cache = CacheManager::new(Arc::new(store));
        Ok(Self::new(config, Arc::new(source), Arc::new(cache)))
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn StorePresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    // ===== Loading =====

    /// Load apps: network first, then a valid cache, then an empty list
    /// carrying the network error.
    ///
    /// Returns immediately if another load is already in flight.
    pub async fn load_apps(&self) {
        let Some(in_flight) = self.begin_load() else {
            debug!("Catalog load already in flight, ignoring request");
            return;
        };

        let outcome = self.run_tiers().await;
        match &outcome {
            TierOutcome::Network(catalog) => {
                info!(apps = catalog.apps.len(), "Loaded catalog from network")
            }
            TierOutcome::Cache { network_error, .. } => {
                info!(error = %network_error, "Network failed, using cached catalog")
            }
            TierOutcome::Empty(error) => {
                warn!(error = %error, "Network failed and no valid cache, showing empty list")
            }
        }

        in_flight.finish(outcome.resolve(self.config.current_app_id()));
    }

    /// Drop the cache and load again, so a fresh network attempt is made
    /// even when the cached catalog is still valid.
    pub async fn force_refresh(&self) {
        self.cache.clear().await;
        if self.config.reset_impressions_on_refresh() {
            self.state.lock().tracked_impressions.clear();
        }
        self.load_apps().await;
    }

    fn begin_load(&self) -> Option<InFlight<'_>> {
        let mut state = self.state.lock();
        if state.snapshot.is_loading {
            return None;
        }
        state.snapshot.is_loading = true;
        state.snapshot.error = None;
        self.publish(&state);
        Some(InFlight {
            service: self,
            finished: false,
        })
    }

    async fn run_tiers(&self) -> TierOutcome {
        match self.fetch_with_deadline().await {
            Ok(catalog) => {
                self.cache.save(&catalog).await;
                TierOutcome::Network(catalog)
            }
            Err(network_error) => match self.cache.load_if_valid().await {
                Some(catalog) => TierOutcome::Cache {
                    catalog,
                    network_error,
                },
                None => TierOutcome::Empty(network_error),
            },
        }
    }

    async fn fetch_with_deadline(&self) -> Result<Catalog, FetchError> {
        let timeout = self.config.fetch_timeout();
        let fetch = self.source.fetch_catalog(self.config.catalog_url());
        match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(source = self.source.name(), timeout_ms = timeout.as_millis() as u64, "Catalog fetch timed out");
                Err(FetchError::Timeout(timeout))
            }
        }
    }

    fn finish_load(&self, result: LoadResult) {
        let mut state = self.state.lock();
        if let Some(catalog) = result.catalog {
            state.catalog = Some(catalog);
        }
        state.snapshot.apps = result.apps;
        state.snapshot.error = result.error;
        state.snapshot.source = result.source;
        state.snapshot.is_loading = false;
        self.publish(&state);
    }

    // ===== Events =====

    /// Report that `app_id` became visible. Only the first call per app id
    /// emits an event.
    pub fn handle_impression(&self, app_id: &str) {
        let first = self.state.lock().tracked_impressions.insert(app_id.to_string());
        if first {
            self.emit(PromoEvent::Impression {
                app_id: app_id.to_string(),
            });
        }
    }

    /// Report a tap on `app_id` and present its store listing.
    pub fn handle_tap(&self, app_id: &str) {
        self.emit(PromoEvent::Tap {
            app_id: app_id.to_string(),
        });

        let app_store_id = {
            let state = self.state.lock();
            state
                .snapshot
                .apps
                .iter()
                .find(|app| app.id == app_id)
                .or_else(|| state.catalog.as_ref().and_then(|c| c.app(app_id)))
                .map(|app| app.app_store_id.clone())
        };

        match app_store_id {
            Some(app_store_id) => self.present_listing(app_store_id),
            None => debug!(app_id = app_id, "Tapped app is not in the catalog, nothing to present"),
        }
    }

    fn present_listing(&self, app_store_id: String) {
        let result = match &self.presenter {
            Some(presenter) => presenter.present_listing(&app_store_id),
            None => Err(PresentError::NoActiveSurface),
        };

        if let Err(e) = result {
            warn!(app_store_id = %app_store_id, error = %e, "Store listing not presented, offering direct link");
            let mut state = self.state.lock();
            state.snapshot.overlay_error = Some(app_store_id);
            self.publish(&state);
        }
    }

    pub fn dismiss_overlay_error(&self) {
        let mut state = self.state.lock();
        if state.snapshot.overlay_error.take().is_some() {
            self.publish(&state);
        }
    }

    /// Open the store listing through its deep link, the fallback for a
    /// failed in-app presentation.
    pub fn open_store_directly(&self, app_store_id: &str) -> Result<(), PresentError> {
        let presenter = self.presenter.as_ref().ok_or(PresentError::NoActiveSurface)?;
        presenter.open_url(&store_link(app_store_id))?;
        self.dismiss_overlay_error();
        Ok(())
    }

    // ===== Event sink registration =====

    /// Register the sink for impression and tap events. Only a weak
    /// reference is kept.
    pub fn set_event_sink<S: EventSink + 'static>(&self, sink: &Arc<S>) {
        let weak: Weak<S> = Arc::downgrade(sink);
        *self.sink.lock() = Some(weak);
    }

    pub fn clear_event_sink(&self) {
        *self.sink.lock() = None;
    }

    fn emit(&self, event: PromoEvent) {
        let sink = self.sink.lock().as_ref().and_then(Weak::upgrade);
        match sink {
            Some(sink) => sink.on_event(&event),
            None => debug!(event = ?event, "No event sink registered, dropping event"),
        }
    }

    // ===== State =====

    /// Clear results, errors and impression tracking. An in-flight load keeps
    /// its loading flag and will still deliver its result.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let is_loading = state.snapshot.is_loading;
        *state = PromoState::default();
        state.snapshot.is_loading = is_loading;
        self.publish(&state);
    }

    pub fn snapshot(&self) -> PromoSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PromoSnapshot> {
        self.updates.subscribe()
    }

    pub fn apps(&self) -> Vec<PromoApp> {
        self.state.lock().snapshot.apps.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().snapshot.is_loading
    }

    pub fn error(&self) -> Option<FetchError> {
        self.state.lock().snapshot.error.clone()
    }

    /// Last unfiltered catalog, from network or cache.
    pub fn catalog(&self) -> Option<Catalog> {
        self.state.lock().catalog.clone()
    }

    pub fn has_tracked_impression(&self, app_id: &str) -> bool {
        self.state.lock().tracked_impressions.contains(app_id)
    }

    pub fn config(&self) -> &PromoConfig {
        &self.config
    }

    fn publish(&self, state: &PromoState) {
        self.updates.send_replace(state.snapshot.clone());
    }
}
