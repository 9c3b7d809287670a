//! Service and application configuration.
//!
//! `PromoConfig` is the immutable per-service configuration: which catalog
//! to fetch and which app is hosting the list. `Settings` is the optional
//! user settings file, stored at `~/.config/promokit/config.json`, plus
//! environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::REQUEST_TIMEOUT_SECS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "promokit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Catalog used when neither settings nor environment name one
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/finepocket/promo-catalog/main/promo-catalog.json";

pub const ENV_CATALOG_URL: &str = "PROMOKIT_CATALOG_URL";
pub const ENV_APP_ID: &str = "PROMOKIT_APP_ID";
pub const ENV_LOCALE: &str = "PROMOKIT_LOCALE";

/// Configuration of a single `PromoService`. Fixed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoConfig {
    catalog_url: String,
    current_app_id: String,
    fetch_timeout: Duration,
    reset_impressions_on_refresh: bool,
}

impl PromoConfig {
    pub fn new(catalog_url: impl Into<String>, current_app_id: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            current_app_id: current_app_id.into(),
            fetch_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            reset_impressions_on_refresh: false,
        }
    }

    /// Upper bound on a single catalog fetch.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Whether `force_refresh` lets every app report its impression again.
    pub fn with_reset_impressions_on_refresh(mut self, reset: bool) -> Self {
        self.reset_impressions_on_refresh = reset;
        self
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    pub fn current_app_id(&self) -> &str {
        &self.current_app_id
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn reset_impressions_on_refresh(&self) -> bool {
        self.reset_impressions_on_refresh
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    pub catalog_url: Option<String>,
    pub app_id: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub reset_impressions_on_refresh: bool,
}

impl Settings {
    /// Load settings from the default location, or defaults if none exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `PROMOKIT_*` environment overrides.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog_url = Some(url);
        }
        if let Some(app_id) = lookup(ENV_APP_ID) {
            self.app_id = Some(app_id);
        }
        if let Some(locale) = lookup(ENV_LOCALE) {
            self.locale = Some(locale);
        }
        self
    }

    /// Build the service configuration. An app id is required.
    pub fn promo_config(&self) -> Result<PromoConfig> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No app id configured (set {} or app_id in settings)", ENV_APP_ID))?;
        let url = self.catalog_url.as_deref().unwrap_or(DEFAULT_CATALOG_URL);
        Ok(PromoConfig::new(url, app_id)
            .with_reset_impressions_on_refresh(self.reset_impressions_on_refresh))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_promo_config_defaults() {
        let config = PromoConfig::new("https://example.com/catalog.json", "finebill");
        assert_eq!(config.catalog_url(), "https://example.com/catalog.json");
        assert_eq!(config.current_app_id(), "finebill");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(REQUEST_TIMEOUT_SECS));
        assert!(!config.reset_impressions_on_refresh());
    }

    #[test]
    fn test_settings_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let settings = Settings {
            catalog_url: Some("https://example.com/c.json".to_string()),
            app_id: Some("finenote".to_string()),
            locale: Some("ko-KR".to_string()),
            reset_impressions_on_refresh: true,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_settings_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides_replace_settings() {
        let env = HashMap::from([
            (ENV_APP_ID, "fromenv"),
            (ENV_LOCALE, "  "),
        ]);
        let settings = Settings {
            app_id: Some("fromfile".to_string()),
            locale: Some("ja".to_string()),
            ..Settings::default()
        }
        .with_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.app_id.as_deref(), Some("fromenv"));
        assert_eq!(settings.locale.as_deref(), Some("ja"));
        assert_eq!(settings.catalog_url, None);
    }

    #[test]
    fn test_promo_config_requires_app_id() {
        assert!(Settings::default().promo_config().is_err());

        let settings = Settings {
            app_id: Some("finebill".to_string()),
            ..Settings::default()
        };
        let config = settings.promo_config().unwrap();
        assert_eq!(config.catalog_url(), DEFAULT_CATALOG_URL);
        assert_eq!(config.current_app_id(), "finebill");
    }
}
