//! Core library for cinecache.
//!
//! Client-side data layer for browsing, searching and bookmarking items
//! from a remote movie catalog:
//!
//! - `api`: typed, validated access to the remote catalog
//! - `cache`: in-memory query cache with request deduplication, plus a
//!   disk cache for offline use
//! - `catalog`: the dispatch facade tying the two together
//! - `state`: durable favorites and preferences
//! - `filter`, `pagination`: client-side category filter and paging
//! - `auth`, `config`, `images`, `storage`, `utils`: supporting pieces

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod images;
pub mod models;
pub mod pagination;
pub mod state;
pub mod storage;
pub mod utils;

pub use api::{ApiClient, ApiError, CatalogSource};
pub use cache::{CacheKey, CacheManager, QueryCache, QuerySnapshot, QueryStatus};
pub use catalog::{Catalog, ItemPage};
pub use config::Config;
pub use filter::filter_by_category;
pub use pagination::{PageRequest, SearchSession, SessionStatus};
pub use state::UserState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
