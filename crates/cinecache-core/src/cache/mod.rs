//! Caching module for catalog queries.
//!
//! Two layers:
//!
//! - `QueryCache`: in-memory, keyed by `CacheKey`, one in-flight fetch per
//!   key and an `idle → pending → success | error` lifecycle per entry
//! - `CacheManager`: JSON files on disk, one per key, so previously seen
//!   pages stay available offline. Considered stale after 60 minutes.

pub mod key;
pub mod manager;
pub mod query;

pub use key::CacheKey;
pub use manager::{CacheAges, CacheManager, CachedData};
pub use query::{QueryCache, QuerySnapshot, QueryStatus};
