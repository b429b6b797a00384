//! Paging through search results.
//!
//! A `SearchSession` shows one page at a time. "Load more" fetches the
//! next page and replaces the displayed items with it; pages are not
//! appended into one growing list. The category filter only narrows the
//! page on screen, so load-more is disabled while a category is selected.
//!
//! Fetches are described by a `PageRequest` ticket. A result is applied
//! only if its ticket still matches the session's outstanding request, so
//! a slow answer for an old term or page cannot overwrite newer results.

use std::sync::Arc;

use tracing::debug;

use crate::api::ApiError;
use crate::catalog::{Catalog, ItemPage};
use crate::filter::filter_by_category;
use crate::models::CatalogItem;

/// One search page the session is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub term: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    term: String,
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    items: Vec<CatalogItem>,
    category: Option<u32>,
    status: SessionStatus,
    in_flight: Option<PageRequest>,
    failed: Option<PageRequest>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            term: String::new(),
            current_page: 0,
            total_pages: 0,
            total_items: 0,
            items: Vec::new(),
            category: None,
            status: SessionStatus::Idle,
            in_flight: None,
            failed: None,
        }
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Accessors =====

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn category(&self) -> Option<u32> {
        self.category
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Items of the displayed page, unfiltered.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items of the displayed page narrowed by the selected category.
    pub fn visible_items(&self) -> Vec<&CatalogItem> {
        filter_by_category(&self.items, self.category)
    }

    pub fn can_load_more(&self) -> bool {
        self.category.is_none() && self.in_flight.is_none() && self.current_page < self.total_pages
    }

    // ===== Transitions =====

    /// Make `term` the active query.
    ///
    /// A new term resets to page 1 and clears the displayed items; the
    /// returned request is the page to fetch. A blank term resolves at
    /// once to the empty result and returns `None`, as does re-entering
    /// the active term. Re-entering a term whose last fetch failed starts
    /// over from page 1.
    pub fn set_term(&mut self, term: &str) -> Option<PageRequest> {
        let term = term.trim();
        let settled = matches!(self.status, SessionStatus::Loading | SessionStatus::Ready);
        if term == self.term && settled {
            return None;
        }

        self.term = term.to_string();
        self.current_page = 1;
        self.total_pages = 0;
        self.total_items = 0;
        self.items.clear();
        self.failed = None;

        if self.term.is_empty() {
            self.current_page = 0;
            self.in_flight = None;
            self.status = SessionStatus::Ready;
            return None;
        }

        Some(self.issue(1))
    }

    /// Request the page after the current one. `None` when there is no
    /// next page, a category is selected, or a fetch is outstanding.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.can_load_more() {
            return None;
        }
        Some(self.issue(self.current_page + 1))
    }

    /// Re-issue the request that last failed.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let failed = self.failed.take()?;
        Some(self.issue(failed.page))
    }

    pub fn select_category(&mut self, category: Option<u32>) {
        self.category = category;
    }

    fn issue(&mut self, page: u32) -> PageRequest {
        let request = PageRequest {
            term: self.term.clone(),
            page,
        };
        self.in_flight = Some(request.clone());
        self.status = SessionStatus::Loading;
        request
    }

    /// Apply the outcome of `request`. Returns `false` and leaves the
    /// session untouched when `request` is no longer the outstanding one.
    pub fn accept(&mut self, request: &PageRequest, result: Result<Arc<ItemPage>, ApiError>) -> bool {
        if self.in_flight.as_ref() != Some(request) {
            debug!(term = %request.term, page = request.page, "Discarding superseded search result");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.current_page = request.page;
                self.total_pages = page.total_pages;
                self.total_items = page.total_items;
                self.items = page.items.clone();
                self.status = SessionStatus::Ready;
            }
            Err(e) => {
                self.failed = Some(request.clone());
                self.status = SessionStatus::Failed(e);
            }
        }
        true
    }

    // ===== Drivers =====

    /// Fetch `request` through `catalog` and apply it.
    pub async fn fetch(&mut self, catalog: &Catalog, request: PageRequest) -> bool {
        let result = catalog.search(&request.term, request.page).await;
        self.accept(&request, result)
    }

    /// `set_term` followed by the fetch it asks for, if any.
    pub async fn search(&mut self, catalog: &Catalog, term: &str) -> bool {
        match self.set_term(term) {
            Some(request) => self.fetch(catalog, request).await,
            None => false,
        }
    }

    /// `load_more` followed by the fetch it asks for, if any.
    pub async fn load_more_from(&mut self, catalog: &Catalog) -> bool {
        match self.load_more() {
            Some(request) => self.fetch(catalog, request).await,
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
