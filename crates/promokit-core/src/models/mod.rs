//! Data models for the promo catalog.
//!
//! This module contains the value types that travel over the wire and
//! into the local cache:
//!
//! - `Catalog`: the root payload, apps in display order plus optional promo rules
//! - `PromoApp`: one promotable app with its store id, icon and tagline
//! - `LocalizedText`, `Language`: tagline text with an English fallback
//! - `PromoEvent`: analytics events handed to the host's event sink

pub mod catalog;
pub mod event;
pub mod localized;

pub use catalog::{store_link, Catalog, Icon, PromoApp, DEFAULT_SYMBOL};
pub use event::PromoEvent;
pub use localized::{Language, LocalizedText};
