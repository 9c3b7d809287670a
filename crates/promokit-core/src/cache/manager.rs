use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Catalog;

use super::{CacheError, KeyValueStore};

/// Cached catalogs expire after 24 hours.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key holding the serialized catalog.
pub const CATALOG_KEY: &str = "promokit.catalog";

/// Key holding the write time in Unix seconds.
pub const TIMESTAMP_KEY: &str = "promokit.timestamp";

/// How far ahead of the clock a stored write time may be before the record
/// is treated as corrupt.
const MAX_CLOCK_SKEW_SECS: f64 = 5.0 * 60.0;

/// Bumped whenever the persisted catalog shape changes incompatibly.
const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedCatalog<T> {
    version: u32,
    catalog: T,
}

fn encode_payload(catalog: &Catalog) -> Result<Vec<u8>, CacheError> {
    let cached = CachedCatalog {
        version: CACHE_FORMAT_VERSION,
        catalog,
    };
    serde_json::to_vec(&cached).map_err(CacheError::Encode)
}

fn decode_payload(bytes: &[u8]) -> Result<Catalog, CacheError> {
    let cached: CachedCatalog<Catalog> =
        serde_json::from_slice(bytes).map_err(CacheError::Decode)?;
    if cached.version != CACHE_FORMAT_VERSION {
        return Err(CacheError::UnsupportedVersion(cached.version));
    }
    Ok(cached.catalog)
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Expiry is inclusive: a record exactly `ttl` old is expired.
fn is_expired_age(age: Duration, ttl: Duration) -> bool {
    age >= ttl
}

/// Age of a record written at `written_at` as seen at `now`.
/// A write time slightly in the future counts as age zero.
fn age_between(written_at: f64, now: f64) -> Duration {
    Duration::from_secs_f64((now - written_at).max(0.0))
}

/// Summary of the cache for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Valid { age: Duration },
    Expired { age: Duration },
}

impl CacheStatus {
    pub fn age_display(age: Duration) -> String {
        let minutes = age.as_secs() / 60;
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CacheStatus::Empty => "Empty (no cache)".to_string(),
            CacheStatus::Valid { age } => format!("Valid (cached {})", Self::age_display(*age)),
            CacheStatus::Expired { age } => {
                format!("Expired (cached {})", Self::age_display(*age))
            }
        }
    }
}

/// Best-effort persistent cache for a single catalog.
///
/// Every operation runs under one async lock, so a save can never interleave
/// with an eviction. Failures are logged and reported as a miss; nothing here
/// returns an error to the caller.
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, CACHE_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            ttl,
        }
    }

    /// Persist `catalog` stamped with the current time.
    ///
    /// The previous record stays intact if encoding or writing fails.
    pub async fn save(&self, catalog: &Catalog) {
        let _guard = self.lock.lock().await;

        let payload = match encode_payload(catalog) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Skipping cache save");
                return;
            }
        };

        // Never stamp a newer record with an older time
        let now = now_secs();
        let written_at = match self.read_timestamp(now) {
            Some(previous) => now.max(previous),
            None => now,
        };
        let previous_payload = self.store.get(CATALOG_KEY).ok().flatten();

        if let Err(e) = self.store.set(CATALOG_KEY, &payload) {
            warn!(error = %e, "Failed to write cached catalog");
            return;
        }

        if let Err(e) = self.store.set(TIMESTAMP_KEY, written_at.to_string().as_bytes()) {
            warn!(error = %e, "Failed to write cache timestamp, restoring previous record");
            let restored = match previous_payload {
                Some(previous) => self.store.set(CATALOG_KEY, &previous),
                None => self.store.remove(CATALOG_KEY),
            };
            if let Err(e) = restored {
                warn!(error = %e, "Failed to restore previous cache record");
            }
            return;
        }

        debug!(apps = catalog.apps.len(), written_at, "Saved catalog to cache");
    }

    /// Return the cached catalog if one exists and is younger than the TTL.
    ///
    /// Expired and undecodable records are evicted.
    pub async fn load_if_valid(&self) -> Option<Catalog> {
        let _guard = self.lock.lock().await;

        let payload = match self.store.get(CATALOG_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached catalog");
                return None;
            }
        };

        match self.read_age() {
            Some(age) if !is_expired_age(age, self.ttl) => {}
            age => {
                debug!(age_secs = ?age.map(|a| a.as_secs()), "Cached catalog expired, evicting");
                self.evict();
                return None;
            }
        }

        match decode_payload(&payload) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!(error = %e, "Cached catalog unreadable, evicting");
                self.evict();
                None
            }
        }
    }

    /// True when there is no record or the record is at least TTL old.
    pub async fn is_expired(&self) -> bool {
        let _guard = self.lock.lock().await;
        self.read_age()
            .map(|age| is_expired_age(age, self.ttl))
            .unwrap_or(true)
    }

    /// Time since the last save, if a record exists.
    pub async fn cache_age(&self) -> Option<Duration> {
        let _guard = self.lock.lock().await;
        self.read_age()
    }

    /// Remove the record. Idempotent.
    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        self.evict();
        debug!("Cleared catalog cache");
    }

    /// Whether a catalog is stored, regardless of its age.
    pub async fn has_data(&self) -> bool {
        let _guard = self.lock.lock().await;
        self.store.contains(CATALOG_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to check cached catalog");
            false
        })
    }

    pub async fn status(&self) -> CacheStatus {
        let _guard = self.lock.lock().await;
        let has_data = self.store.contains(CATALOG_KEY).unwrap_or(false);
        match (has_data, self.read_age()) {
            (true, Some(age)) if is_expired_age(age, self.ttl) => CacheStatus::Expired { age },
            (true, Some(age)) => CacheStatus::Valid { age },
            _ => CacheStatus::Empty,
        }
    }

    // ===== Helpers (caller holds the lock) =====

    /// Stored write time. Times further than `MAX_CLOCK_SKEW_SECS` ahead of
    /// `now` read as missing, so the record counts as expired.
    fn read_timestamp(&self, now: f64) -> Option<f64> {
        let bytes = match self.store.get(TIMESTAMP_KEY) {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(error = %e, "Failed to read cache timestamp");
                return None;
            }
        };
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .filter(|secs| {
                let in_range = *secs <= now + MAX_CLOCK_SKEW_SECS;
                if !in_range {
                    warn!(written_at = *secs, now, "Cache timestamp is in the future, ignoring it");
                }
                in_range
            })
    }

    fn read_age(&self) -> Option<Duration> {
        let now = now_secs();
        self.read_timestamp(now)
            .map(|written_at| age_between(written_at, now))
    }

    fn evict(&self) {
        for key in [CATALOG_KEY, TIMESTAMP_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key = key, error = %e, "Failed to evict cache entry");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
