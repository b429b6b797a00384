//! Data models for catalog entities and user state.
//!
//! This module contains the typed records used everywhere downstream of
//! the API client:
//!
//! - `CatalogItem`, `Category`, `QueryResult`: list and search results
//! - `CatalogDetail`, `Trailer`, `CastMember`: the expanded detail record
//! - `FavoriteItem`: an immutable snapshot of a favorited item
//! - `Preferences`, `ViewMode`: persisted display preferences

pub mod detail;
pub mod favorite;
pub mod item;
pub mod preferences;

pub use detail::{CastMember, CatalogDetail, Trailer};
pub use favorite::FavoriteItem;
pub use item::{CatalogItem, Category, CategoryList, QueryResult};
pub use preferences::{Preferences, ViewMode};
