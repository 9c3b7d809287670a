//! Remote catalog fetching.
//!
//! This module provides the `CatalogSource` abstraction and its HTTP
//! implementation, `HttpCatalogClient`. A fetch performs exactly one GET,
//! checks the status code and decodes the JSON body into a `Catalog`.
//! Retrying and caching are left to the caller.

pub mod client;
pub mod error;

pub use client::{CatalogSource, HttpCatalogClient};
pub use error::FetchError;
