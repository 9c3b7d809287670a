use std::collections::HashMap;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::LocalizedText;

/// Scheme used by catalogs to reference a bundled symbol instead of a remote image.
const SYMBOL_SCHEME: &str = "sf-symbol";

/// Symbol shown when an icon reference cannot be interpreted.
pub const DEFAULT_SYMBOL: &str = "app.fill";

/// Base URL for direct store deep links.
const STORE_LINK_BASE: &str = "https://apps.apple.com/app/id";

/// Root payload of the remote catalog.
///
/// `apps` keeps the order of the JSON document; that order is the display order.
/// `promo_rules` maps a host app id to the ids it is allowed to promote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Catalog {
    pub apps: Vec<PromoApp>,
    #[serde(rename = "promoRules", default, skip_serializing_if = "Option::is_none")]
    pub promo_rules: Option<HashMap<String, Vec<String>>>,
}

impl Catalog {
    pub fn new(apps: Vec<PromoApp>) -> Self {
        Self {
            apps,
            promo_rules: None,
        }
    }

    pub fn with_rules(mut self, rules: HashMap<String, Vec<String>>) -> Self {
        self.promo_rules = Some(rules);
        self
    }

    /// Decode a catalog from its JSON representation.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode the catalog in the same JSON shape the server sends.
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn app(&self, id: &str) -> Option<&PromoApp> {
        self.apps.iter().find(|app| app.id == id)
    }

    /// Allow-list for the given host app, if the catalog defines one.
    pub fn rules_for(&self, host_app_id: &str) -> Option<&[String]> {
        self.promo_rules
            .as_ref()
            .and_then(|rules| rules.get(host_app_id))
            .map(Vec::as_slice)
    }
}

/// A promotable app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PromoApp {
    /// Stable identifier, e.g. "finebill"
    pub id: String,
    /// Display name, e.g. "FineBill"
    pub name: String,
    #[serde(rename = "appStoreID")]
    pub app_store_id: String,
    /// Remote image URL or an `sf-symbol://name` reference
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub category: String,
    pub tagline: LocalizedText,
}

/// Where an app icon comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Remote(Url),
    Symbol(String),
}

impl PromoApp {
    pub fn icon(&self) -> Icon {
        match Url::parse(&self.icon_url) {
            Ok(url) if url.scheme() == SYMBOL_SCHEME => {
                let name = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .unwrap_or(DEFAULT_SYMBOL);
                Icon::Symbol(name.to_string())
            }
            Ok(url) => Icon::Remote(url),
            Err(_) => Icon::Symbol(DEFAULT_SYMBOL.to_string()),
        }
    }

    pub fn store_url(&self) -> String {
        store_link(&self.app_store_id)
    }
}

/// Direct deep link to the store listing of `app_store_id`.
pub fn store_link(app_store_id: &str) -> String {
    format!("{}{}", STORE_LINK_BASE, app_store_id)
}

// ============================================================================
// Tests
// ============================================================================
