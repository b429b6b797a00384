//! REST API client module for the remote movie catalog.
//!
//! This module provides the `ApiClient` for reading trending lists,
//! search results, item details and the category list from a TMDB-style
//! catalog, and the `CatalogSource` trait the rest of the crate depends on.
//!
//! Requests are authenticated with a static API key passed as a query
//! parameter. Payloads are parsed and validated here, once; everything
//! downstream works with the typed models.

pub mod client;
pub mod error;

pub use client::{ApiClient, CatalogSource};
pub use error::ApiError;
