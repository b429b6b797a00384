//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use cinecache_core::models::{CatalogDetail, CatalogItem, Category, CategoryList, QueryResult};
use cinecache_core::{ApiError, CatalogSource};

pub fn item(id: u64, title: &str, category_ids: &[u32]) -> CatalogItem {
    CatalogItem {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        release_date: "2008-07-16".to_string(),
        vote_average: 7.0,
        overview: format!("Overview of {}", title),
        category_ids: Some(category_ids.to_vec()),
        categories: None,
    }
}

pub fn page(page: u32, total_pages: u32, items: Vec<CatalogItem>) -> QueryResult<CatalogItem> {
    QueryResult {
        page,
        items,
        total_pages,
        total_items: u64::from(total_pages) * 2,
    }
}

/// In-memory catalog that counts every call it receives.
pub struct FakeSource {
    pub trending: QueryResult<CatalogItem>,
    pub searches: HashMap<(String, u32), QueryResult<CatalogItem>>,
    pub trending_calls: AtomicUsize,
    pub search_calls: Mutex<Vec<(String, u32)>>,
    pub detail_calls: AtomicUsize,
    /// Remaining calls that fail with a server error
    pub failures_left: AtomicUsize,
    /// Every fetch waits for a permit; tests close it to hold fetches
    /// in flight.
    pub gate: Semaphore,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            trending: page(1, 1, vec![item(1, "Trending One", &[28]), item(2, "Trending Two", &[18])]),
            searches: HashMap::new(),
            trending_calls: AtomicUsize::new(0),
            search_calls: Mutex::new(Vec::new()),
            detail_calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    /// A source whose fetches block until `gate.add_permits` is called.
    pub fn gated() -> Self {
        Self {
            gate: Semaphore::new(0),
            ..Self::new()
        }
    }

    pub fn with_search(mut self, term: &str, result: QueryResult<CatalogItem>) -> Self {
        self.searches.insert((term.to_string(), result.page), result);
        self
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.lock().len()
    }

    async fn pass_gate(&self) -> Result<(), ApiError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ApiError::ServerError("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn fetch_trending(&self) -> Result<QueryResult<CatalogItem>, ApiError> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await?;
        Ok(self.trending.clone())
    }

    async fn fetch_search(&self, term: &str, page: u32) -> Result<QueryResult<CatalogItem>, ApiError> {
        self.search_calls.lock().push((term.to_string(), page));
        if term.trim().is_empty() {
            return Ok(QueryResult::empty());
        }
        self.pass_gate().await?;
        Ok(self
            .searches
            .get(&(term.to_string(), page))
            .cloned()
            .unwrap_or_else(QueryResult::empty))
    }

    async fn fetch_detail(&self, id: u64) -> Result<CatalogDetail, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await?;
        let mut detail_item = item(id, &format!("Detail {}", id), &[]);
        detail_item.category_ids = None;
        detail_item.categories = Some(vec![Category { id: 18, name: "Drama".to_string() }]);
        Ok(CatalogDetail {
            item: detail_item,
            trailer: None,
            cast: Vec::new(),
        })
    }

    async fn fetch_categories(&self) -> Result<CategoryList, ApiError> {
        self.pass_gate().await?;
        Ok(CategoryList {
            categories: vec![
                Category { id: 18, name: "Drama".to_string() },
                Category { id: 28, name: "Action".to_string() },
            ],
        })
    }
}
