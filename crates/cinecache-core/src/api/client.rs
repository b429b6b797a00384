//! API client for communicating with the remote catalog REST API.
//!
//! This module provides the `ApiClient` struct for reading trending items,
//! search pages, item details and the category list.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::models::item::null_as_default;
use crate::models::{
    CastMember, CatalogDetail, CatalogItem, CategoryList, QueryResult, Trailer,
};
use crate::models::detail::MAX_CAST_MEMBERS;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for catalog endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Extra sub-resources requested with every detail fetch
const DETAIL_APPEND: &str = "videos,credits";

// ============================================================================
// Catalog source seam
// ============================================================================

/// Read-only queries against a catalog.
///
/// `ApiClient` is the production implementation; the cache and the
/// pagination layer only ever see this trait.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_trending(&self) -> Result<QueryResult<CatalogItem>, ApiError>;

    /// An empty or whitespace-only term yields `QueryResult::empty()`.
    async fn fetch_search(&self, term: &str, page: u32)
        -> Result<QueryResult<CatalogItem>, ApiError>;

    async fn fetch_detail(&self, id: u64) -> Result<CatalogDetail, ApiError>;

    async fn fetch_categories(&self) -> Result<CategoryList, ApiError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(flatten)]
    item: CatalogItem,
    #[serde(default)]
    videos: Option<VideoList>,
    #[serde(default)]
    credits: Option<Credits>,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<VideoResponse>,
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    site: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    video_type: String,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastResponse>,
}

#[derive(Debug, Deserialize)]
struct CastResponse {
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    character: String,
    #[serde(default)]
    profile_path: Option<String>,
}

impl DetailResponse {
    fn into_detail(self) -> CatalogDetail {
        let trailer = self
            .videos
            .map(|v| v.results)
            .unwrap_or_default()
            .into_iter()
            .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
            .map(|v| Trailer {
                key: v.key,
                name: v.name,
                site: v.site,
            });

        let cast = self
            .credits
            .map(|c| c.cast)
            .unwrap_or_default()
            .into_iter()
            .take(MAX_CAST_MEMBERS)
            .map(|c| CastMember {
                name: c.name,
                character: c.character,
                profile_path: c.profile_path,
            })
            .collect();

        CatalogDetail {
            item: self.item,
            trailer,
            cast,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the remote catalog.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Set the API key sent with every request
    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Create a new ApiClient with the given key, sharing the connection pool.
    pub fn with_api_key(&self, api_key: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            api_key: Some(api_key),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Issue a GET and decode the body. No retries here; the query cache
    /// decides when to ask again.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path = path, "GET");

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(query);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("api_key", key)]);
        }

        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    fn validated(path: &str, result: QueryResult<CatalogItem>) -> Result<QueryResult<CatalogItem>, ApiError> {
        result
            .validate()
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))?;
        Ok(result)
    }
}

#[async_trait]
impl CatalogSource for ApiClient {
    /// Fetch today's trending movies
    async fn fetch_trending(&self) -> Result<QueryResult<CatalogItem>, ApiError> {
        let path = "/trending/movie/day";
        let result = self.get(path, &[]).await?;
        Self::validated(path, result)
    }

    /// Fetch one page of search results for `term`
    async fn fetch_search(&self, term: &str, page: u32) -> Result<QueryResult<CatalogItem>, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(QueryResult::empty());
        }

        let path = "/search/movie";
        let query = [("query", term.to_string()), ("page", page.max(1).to_string())];
        let result = self.get(path, &query).await?;
        Self::validated(path, result)
    }

    /// Fetch one item with its categories, trailer and cast
    async fn fetch_detail(&self, id: u64) -> Result<CatalogDetail, ApiError> {
        let path = format!("/movie/{}", id);
        let response: DetailResponse = self
            .get(&path, &[("append_to_response", DETAIL_APPEND.to_string())])
            .await?;
        response
            .item
            .validate()
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))?;
        Ok(response.into_detail())
    }

    /// Fetch the list of categories used by `genre_ids`
    async fn fetch_categories(&self) -> Result<CategoryList, ApiError> {
        self.get("/genre/movie/list", &[]).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detail_response() {
        let json = r#"{
            "id": 155, "title": "The Dark Knight", "poster_path": "/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
            "backdrop_path": "/nMKdUUepR0i5zn0y1T4CsSB5chy.jpg", "release_date": "2008-07-16",
            "vote_average": 8.5, "overview": "Batman raises the stakes.",
            "genres": [{"id": 18, "name": "Drama"}, {"id": 28, "name": "Action"}],
            "videos": {"results": [
                {"key": "abc", "name": "Teaser", "site": "YouTube", "type": "Teaser"},
                {"key": "EXeTwQWrcwY", "name": "Official Trailer", "site": "YouTube", "type": "Trailer"}
            ]},
            "credits": {"cast": [{"name": "Christian Bale", "character": "Bruce Wayne", "profile_path": null}]}
        }"#;

        let resp: DetailResponse = serde_json::from_str(json)
            .expect("Failed to parse detail test JSON");
        let detail = resp.into_detail();

        assert_eq!(detail.item.id, 155);
        assert!(detail.item.category_ids.is_none());
        assert_eq!(detail.category_names(), "Drama, Action");
        let trailer = detail.trailer.expect("Expected a trailer");
        assert_eq!(trailer.key, "EXeTwQWrcwY");
        assert_eq!(trailer.embed_url(), "https://www.youtube.com/embed/EXeTwQWrcwY");
        assert_eq!(detail.cast.len(), 1);
        assert_eq!(detail.cast[0].character, "Bruce Wayne");
    }

    #[test]
    fn test_detail_without_extras() {
        let json = r#"{"id": 1, "title": "Plain"}"#;
        let resp: DetailResponse = serde_json::from_str(json)
            .expect("Failed to parse detail test JSON");
        let detail = resp.into_detail();
        assert!(detail.trailer.is_none());
        assert!(detail.cast.is_empty());
    }

    #[test]
    fn test_detail_cast_is_capped() {
        let cast: Vec<String> = (0..15)
            .map(|i| format!(r#"{{"name": "Actor {}", "character": "Role"}}"#, i))
            .collect();
        let json = format!(r#"{{"id": 1, "title": "Crowded", "credits": {{"cast": [{}]}}}}"#, cast.join(","));
        let resp: DetailResponse = serde_json::from_str(&json)
            .expect("Failed to parse detail test JSON");
        let detail = resp.into_detail();
        assert_eq!(detail.cast.len(), MAX_CAST_MEMBERS);
        assert_eq!(detail.cast[0].name, "Actor 0");
    }

    #[test]
    fn test_parse_search_page() {
        let json = r#"{"page": 1, "results": [{"id": 268, "title": "Batman", "genre_ids": [28]}], "total_pages": 3, "total_results": 55}"#;
        let page: QueryResult<CatalogItem> = serde_json::from_str(json)
            .expect("Failed to parse search test JSON");
        let page = ApiClient::validated("/search/movie", page).expect("Page should validate");
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 55);
        assert_eq!(page.items[0].title, "Batman");
    }

    #[test]
    fn test_validated_rejects_out_of_range_page() {
        let json = r#"{"page": 4, "results": [{"id": 1, "title": "X"}], "total_pages": 3, "total_results": 55}"#;
        let page: QueryResult<CatalogItem> = serde_json::from_str(json)
            .expect("Failed to parse search test JSON");
        assert!(matches!(
            ApiClient::validated("/search/movie", page),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_search_skips_network() {
        // Nothing listens on port 9; a request would fail.
        let client = ApiClient::new("http://127.0.0.1:9").expect("Failed to build client");
        let result = client.fetch_search("   ", 1).await.expect("Empty search should not fail");
        assert_eq!(result, QueryResult::empty());
    }

    #[tokio::test]
    async fn test_transport_error_omits_api_key() {
        let client = ApiClient::new("http://127.0.0.1:9")
            .expect("Failed to build client")
            .with_api_key("SECRETKEY123".to_string());
        let err = client.fetch_trending().await.expect_err("nothing listens on port 9");
        assert!(matches!(err, ApiError::NetworkError(_)));
        assert!(!err.to_string().contains("SECRETKEY123"), "leaked key: {}", err);
        assert!(!format!("{:?}", err).contains("SECRETKEY123"));
    }
}
