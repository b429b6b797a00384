use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::key::CacheKey;
use crate::models::{CatalogDetail, CatalogItem, CategoryList, QueryResult};

/// Entries older than this many minutes are worth refreshing.
/// Trending lists turn over daily; an hour keeps them reasonably fresh.
const STALE_AFTER_MINUTES: i64 = 60;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Extension of cache files
const CACHE_EXTENSION: &str = "json";

/// A cached payload stamped with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

/// `value / unit`, rounded half up.
fn rounded(value: i64, unit: i64) -> i64 {
    (value + unit / 2) / unit
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self { data, cached_at: Utc::now() }
    }

    pub fn age_minutes(&self) -> i64 {
        Utc::now().signed_duration_since(self.cached_at).num_minutes()
    }

    /// Short relative age: "just now", "12m ago", "2h ago", "3d ago".
    /// Clock skew can make the age negative; that also reads "just now".
    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            m if m < 1 => "just now".to_string(),
            m if m < MINUTES_PER_HOUR => format!("{}m ago", m),
            m if m < MINUTES_PER_DAY => format!("{}h ago", rounded(m, MINUTES_PER_HOUR)),
            m => format!("{}d ago", rounded(m, MINUTES_PER_DAY)),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > STALE_AFTER_MINUTES
    }
}

/// Disk copy of fetched queries, one JSON file per `CacheKey`.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", key.file_stem(), CACHE_EXTENSION))
    }

    /// `Ok(None)` when nothing is cached under `key`.
    pub fn load<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CachedData<T>>> {
        let contents = match std::fs::read_to_string(self.cache_path(key)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to read cache entry {}", key)),
        };
        let cached = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry {}", key))?;
        Ok(Some(cached))
    }

    pub fn save<T: Serialize>(&self, key: &CacheKey, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(&CachedData::new(data))
            .with_context(|| format!("Failed to encode cache entry {}", key))?;
        std::fs::write(self.cache_path(key), json)
            .with_context(|| format!("Failed to write cache entry {}", key))?;
        debug!(key = %key, "Saved to disk cache");
        Ok(())
    }

    pub fn remove(&self, key: &CacheKey) -> Result<()> {
        match std::fs::remove_file(self.cache_path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("Failed to remove cache entry {}", key))
            }
            _ => Ok(()),
        }
    }

    /// Delete every cache file. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.cache_files()? {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.cache_files()?.len())
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.cache_dir)
            .with_context(|| format!("Failed to list {}", self.cache_dir.display()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    // ===== Trending =====

    pub fn load_trending(&self) -> Result<Option<CachedData<QueryResult<CatalogItem>>>> {
        self.load(&CacheKey::Trending)
    }

    pub fn save_trending(&self, page: &QueryResult<CatalogItem>) -> Result<()> {
        self.save(&CacheKey::Trending, page)
    }

    // ===== Search =====

    pub fn load_search(&self, term: &str, page: u32) -> Result<Option<CachedData<QueryResult<CatalogItem>>>> {
        self.load(&CacheKey::search(term, page))
    }

    pub fn save_search(&self, term: &str, page: u32, result: &QueryResult<CatalogItem>) -> Result<()> {
        self.save(&CacheKey::search(term, page), result)
    }

    // ===== Detail =====

    pub fn load_detail(&self, id: u64) -> Result<Option<CachedData<CatalogDetail>>> {
        self.load(&CacheKey::Detail(id))
    }

    pub fn save_detail(&self, detail: &CatalogDetail) -> Result<()> {
        self.save(&CacheKey::Detail(detail.item.id), detail)
    }

    // ===== Categories =====

    pub fn load_categories(&self) -> Result<Option<CachedData<CategoryList>>> {
        self.load(&CacheKey::Categories)
    }

    pub fn save_categories(&self, categories: &CategoryList) -> Result<()> {
        self.save(&CacheKey::Categories, categories)
    }

    // ===== Freshness =====

    /// Age of one entry for display. Unreadable entries count as missing.
    fn entry_age<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<String> {
        self.load::<T>(key)
            .unwrap_or_else(|e| {
                debug!(key = %key, error = %e, "Ignoring unreadable cache entry");
                None
            })
            .map(|cached| cached.age_display())
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            trending: self.entry_age::<QueryResult<CatalogItem>>(&CacheKey::Trending),
            categories: self.entry_age::<CategoryList>(&CacheKey::Categories),
        }
    }

    /// True when trending is missing, unreadable, or past the threshold.
    pub fn is_trending_stale(&self) -> bool {
        self.load_trending()
            .unwrap_or_else(|e| {
                debug!(error = %e, "Unreadable trending cache treated as stale");
                None
            })
            .map_or(true, |cached| cached.is_stale())
    }
}

/// Display ages of the entries shown in `cache-status`.
#[derive(Debug, Default)]
pub struct CacheAges {
    pub trending: Option<String>,
    pub categories: Option<String>,
}

impl CacheAges {
    pub fn trending_age(&self) -> &str {
        self.trending.as_deref().unwrap_or("never")
    }

    pub fn categories_age(&self) -> &str {
        self.categories.as_deref().unwrap_or("never")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn page(ids: &[u64]) -> QueryResult<CatalogItem> {
        QueryResult {
            page: 1,
            items: ids
                .iter()
                .map(|&id| CatalogItem {
                    id,
                    title: format!("Movie {}", id),
                    poster_path: None,
                    backdrop_path: None,
                    release_date: String::new(),
                    vote_average: 5.0,
                    overview: String::new(),
                    category_ids: Some(vec![28]),
                    categories: None,
                })
                .collect(),
            total_pages: 1,
            total_items: ids.len() as u64,
        }
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::minutes(1440 + 60);
        assert_eq!(cached.age_display(), "1d ago");
        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_staleness_threshold() {
        let mut cached = CachedData::new("page");
        assert!(!cached.is_stale());
        cached.cached_at = Utc::now() - Duration::minutes(59);
        assert!(!cached.is_stale());
        cached.cached_at = Utc::now() - Duration::minutes(61);
        assert!(cached.is_stale());
    }

    #[test]
    fn test_trending_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");

        assert!(cache.load_trending().expect("load should not fail").is_none());
        assert!(cache.is_trending_stale());

        cache.save_trending(&page(&[1, 2])).expect("save should not fail");
        let loaded = cache
            .load_trending()
            .expect("load should not fail")
            .expect("trending should be cached");
        let ids: Vec<u64> = loaded.data.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(loaded.data.items[0].category_ids, Some(vec![28]));
        assert!(!cache.is_trending_stale());
        assert_eq!(cache.get_cache_ages().trending_age(), "just now");
        assert_eq!(cache.get_cache_ages().categories_age(), "never");
    }

    #[test]
    fn test_search_pages_are_separate_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");

        cache.save_search("batman", 1, &page(&[1])).expect("save should not fail");
        cache.save_search("batman", 2, &page(&[2])).expect("save should not fail");
        assert_eq!(cache.entry_count().expect("count"), 2);

        let second = cache
            .load_search(" batman ", 2)
            .expect("load should not fail")
            .expect("page 2 should be cached");
        assert_eq!(second.data.items[0].id, 2);

        cache.remove(&CacheKey::search("batman", 1)).expect("remove should not fail");
        assert!(cache.load_search("batman", 1).expect("load").is_none());
        assert_eq!(cache.clear().expect("clear"), 1);
        assert_eq!(cache.entry_count().expect("count"), 0);
    }

    #[test]
    fn test_long_search_term_is_cached() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");
        let term = "ß".repeat(200);

        cache.save_search(&term, 1, &page(&[9])).expect("save should not fail");
        let loaded = cache
            .load_search(&term, 1)
            .expect("load should not fail")
            .expect("page should be cached");
        assert_eq!(loaded.data.items[0].id, 9);
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");
        std::fs::write(dir.path().join("trending.json"), "{oops").expect("write");
        assert!(cache.load_trending().is_err());
        assert!(cache.is_trending_stale());
        assert_eq!(cache.get_cache_ages().trending, None);
    }
}
