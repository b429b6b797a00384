//! Single entry point for catalog queries.
//!
//! `Catalog` maps each query to its `CacheKey`, routes it through the
//! in-memory `QueryCache` and, on a miss, to the `CatalogSource`.
//! Successful fetches are copied to the disk cache; in offline mode the
//! disk cache is the only source.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiError, CatalogSource};
use crate::cache::{CacheKey, CacheManager, QueryCache, QuerySnapshot};
use crate::models::{CatalogDetail, CatalogItem, CategoryList, QueryResult};

pub type ItemPage = QueryResult<CatalogItem>;

pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    lists: QueryCache<CacheKey, ItemPage>,
    details: QueryCache<CacheKey, CatalogDetail>,
    categories: QueryCache<CacheKey, CategoryList>,
    disk: Option<CacheManager>,
    offline: bool,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            lists: QueryCache::new(),
            details: QueryCache::new(),
            categories: QueryCache::new(),
            disk: None,
            offline: false,
        }
    }

    /// Copy every successful fetch to `disk`, and serve from it offline.
    pub fn with_disk_cache(mut self, disk: CacheManager) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn disk_cache(&self) -> Option<&CacheManager> {
        self.disk.as_ref()
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Switch between network and disk-only mode. Memory entries are
    /// dropped so nothing fetched under the old mode is served under the
    /// new one.
    pub fn set_offline(&mut self, offline: bool) {
        if self.offline != offline {
            info!(offline, "Catalog mode changed");
            self.offline = offline;
            self.clear();
        }
    }

    pub fn clear(&self) {
        self.lists.clear();
        self.details.clear();
        self.categories.clear();
    }

    // ===== Queries =====

    pub async fn trending(&self) -> Result<Arc<ItemPage>, ApiError> {
        self.fetch(&self.lists, CacheKey::Trending, |source| async move {
            source.fetch_trending().await
        })
        .await
    }

    /// One page of results for `term`. A blank term resolves to the empty
    /// result without touching the cache or the network.
    pub async fn search(&self, term: &str, page: u32) -> Result<Arc<ItemPage>, ApiError> {
        let term = term.trim().to_string();
        if term.is_empty() {
            return Ok(Arc::new(QueryResult::empty()));
        }

        let key = CacheKey::search(&term, page);
        self.fetch(&self.lists, key, move |source| async move {
            source.fetch_search(&term, page).await
        })
        .await
    }

    pub async fn detail(&self, id: u64) -> Result<Arc<CatalogDetail>, ApiError> {
        self.fetch(&self.details, CacheKey::Detail(id), move |source| async move {
            source.fetch_detail(id).await
        })
        .await
    }

    pub async fn categories(&self) -> Result<Arc<CategoryList>, ApiError> {
        self.fetch(&self.categories, CacheKey::Categories, |source| async move {
            source.fetch_categories().await
        })
        .await
    }

    /// Fetch trending again even if it is cached.
    pub async fn refresh_trending(&self) -> Result<Arc<ItemPage>, ApiError> {
        if self.offline {
            return self.trending().await;
        }
        let source = Arc::clone(&self.source);
        let disk = self.disk.clone();
        self.lists
            .refetch(CacheKey::Trending, move || async move {
                let page = source.fetch_trending().await?;
                Self::write_disk(disk.as_ref(), &CacheKey::Trending, &page);
                Ok(page)
            })
            .await
    }

    // ===== Entry state =====

    pub fn trending_state(&self) -> QuerySnapshot<ItemPage> {
        self.lists.get(&CacheKey::Trending)
    }

    pub fn search_state(&self, term: &str, page: u32) -> QuerySnapshot<ItemPage> {
        self.lists.get(&CacheKey::search(term, page))
    }

    pub fn detail_state(&self, id: u64) -> QuerySnapshot<CatalogDetail> {
        self.details.get(&CacheKey::Detail(id))
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        match key {
            CacheKey::Trending | CacheKey::Search { .. } => self.lists.invalidate(key),
            CacheKey::Detail(_) => self.details.invalidate(key),
            CacheKey::Categories => self.categories.invalidate(key),
        }
    }

    // ===== Dispatch =====

    fn fetch<V, F, Fut>(
        &self,
        cache: &QueryCache<CacheKey, V>,
        key: CacheKey,
        fetch: F,
    ) -> impl Future<Output = Result<Arc<V>, ApiError>> + Send + 'static
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce(Arc<dyn CatalogSource>) -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let disk = self.disk.clone();
        let disk_key = key.clone();

        if self.offline {
            return futures::future::Either::Left(cache.run(key, move || async move {
                Self::read_disk(disk.as_ref(), &disk_key)
            }));
        }

        let source = Arc::clone(&self.source);
        futures::future::Either::Right(cache.run(key, move || {
            let request = fetch(source);
            async move {
                let value = request.await?;
                Self::write_disk(disk.as_ref(), &disk_key, &value);
                Ok(value)
            }
        }))
    }

    fn read_disk<V: DeserializeOwned>(disk: Option<&CacheManager>, key: &CacheKey) -> Result<V, ApiError> {
        let Some(disk) = disk else {
            return Err(ApiError::Offline(key.to_string()));
        };
        match disk.load::<V>(key) {
            Ok(Some(cached)) => {
                debug!(key = %key, age = %cached.age_display(), "Serving from disk cache");
                Ok(cached.data)
            }
            Ok(None) => Err(ApiError::Offline(key.to_string())),
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable disk cache entry");
                Err(ApiError::Offline(key.to_string()))
            }
        }
    }

    fn write_disk<V: Serialize>(disk: Option<&CacheManager>, key: &CacheKey, value: &V) {
        if let Some(disk) = disk {
            if let Err(e) = disk.save(key, value) {
                warn!(key = %key, error = %e, "Failed to write disk cache");
            }
        }
    }
}
