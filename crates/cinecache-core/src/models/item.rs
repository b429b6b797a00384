//! Catalog items and paged query results.
//!
//! Field names follow the remote API's JSON so that the same types decode
//! API payloads and round-trip through the disk cache.

use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound of the catalog's score scale.
pub const MAX_SCORE: f64 = 10.0;

/// Decode `null` or a missing field as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A category (genre) as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// Response of the category list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(rename = "genres", default)]
    pub categories: Vec<Category>,
}

impl CategoryList {
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

/// A catalog entity. `id` is the only identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    /// Present on list results only.
    #[serde(rename = "genre_ids", default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<u32>>,
    /// Present on detail results only.
    #[serde(rename = "genres", default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

impl PartialEq for CatalogItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CatalogItem {}

impl CatalogItem {
    /// Whether this item's list-shaped category ids include `category_id`.
    /// Items without `category_ids` never match.
    pub fn has_category(&self, category_id: u32) -> bool {
        self.category_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(&category_id))
    }

    /// Four-digit release year, if the release date carries one.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.get(..4).and_then(|y| y.parse().ok())
    }

    /// Score rescaled to a five-point scale with one decimal, or "N/A".
    pub fn display_rating(&self) -> String {
        if self.vote_average > 0.0 {
            format!("{:.1}", self.vote_average / 2.0)
        } else {
            "N/A".to_string()
        }
    }

    /// Check the fields serde cannot: non-empty title and an in-range score.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(format!("item {} has an empty title", self.id));
        }
        if !self.vote_average.is_finite() || !(0.0..=MAX_SCORE).contains(&self.vote_average) {
            return Err(format!(
                "item {} has score {} outside 0-{}",
                self.id, self.vote_average, MAX_SCORE
            ));
        }
        Ok(())
    }
}

/// One page of a paged query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct QueryResult<T> {
    pub page: u32,
    #[serde(rename = "results", default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(rename = "total_results", default)]
    pub total_items: u64,
}

impl<T> QueryResult<T> {
    /// The zero result of a query with nothing to ask for.
    pub fn empty() -> Self {
        Self {
            page: 0,
            items: Vec::new(),
            total_pages: 0,
            total_items: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

impl QueryResult<CatalogItem> {
    /// Validate the page bounds and every item on the page.
    pub fn validate(&self) -> Result<(), String> {
        if !self.items.is_empty() && (self.page == 0 || self.page > self.total_pages) {
            return Err(format!(
                "page {} is outside 1..={} for a non-empty result",
                self.page, self.total_pages
            ));
        }
        self.items.iter().try_for_each(CatalogItem::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, category_ids: Option<Vec<u32>>) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("Movie {}", id),
            poster_path: None,
            backdrop_path: None,
            release_date: String::new(),
            vote_average: 0.0,
            overview: String::new(),
            category_ids,
            categories: None,
        }
    }

    #[test]
    fn test_parse_list_item() {
        let json = r#"{"id": 268, "title": "Batman", "poster_path": "/cij4dd21v2Rk2YtUQbV5kW69WB2.jpg", "backdrop_path": null, "release_date": "1989-06-21", "vote_average": 7.2, "overview": "Gotham.", "genre_ids": [14, 28]}"#;
        let item: CatalogItem = serde_json::from_str(json).expect("Failed to parse item JSON");
        assert_eq!(item.id, 268);
        assert_eq!(item.category_ids, Some(vec![14, 28]));
        assert!(item.categories.is_none());
        assert!(item.backdrop_path.is_none());
        assert_eq!(item.release_year(), Some(1989));
        assert_eq!(item.display_rating(), "3.6");
    }

    #[test]
    fn test_parse_page_without_results() {
        let page: QueryResult<CatalogItem> =
            serde_json::from_str(r#"{"page": 1}"#).expect("Failed to parse page JSON");
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);

        let json = r#"{"page": 2, "results": [{"id": 5, "title": "Five"}], "total_pages": 3, "total_results": 41}"#;
        let page: QueryResult<CatalogItem> = serde_json::from_str(json).expect("Failed to parse page JSON");
        assert_eq!(page.items[0].id, 5);
        assert_eq!(page.total_items, 41);
        assert!(page.has_more());
    }

    #[test]
    fn test_parse_item_with_null_fields() {
        let json = r#"{"id": 1, "title": "Untitled", "release_date": null, "overview": null}"#;
        let item: CatalogItem = serde_json::from_str(json).expect("Failed to parse item JSON");
        assert_eq!(item.release_date, "");
        assert_eq!(item.overview, "");
        assert_eq!(item.vote_average, 0.0);
        assert_eq!(item.release_year(), None);
        assert_eq!(item.display_rating(), "N/A");
    }

    #[test]
    fn test_parse_item_without_id_fails() {
        let json = r#"{"title": "No id"}"#;
        assert!(serde_json::from_str::<CatalogItem>(json).is_err());
    }

    #[test]
    fn test_identity_is_id_only() {
        let mut a = item(7, Some(vec![1]));
        let b = item(7, None);
        a.title = "Stale title".to_string();
        assert_eq!(a, b);
        assert_ne!(item(7, None), item(8, None));
    }

    #[test]
    fn test_has_category_ignores_detail_shape() {
        let mut detail = item(1, None);
        detail.categories = Some(vec![Category { id: 18, name: "Drama".to_string() }]);
        assert!(!detail.has_category(18));

        let listed = item(2, Some(vec![18]));
        assert!(listed.has_category(18));
        assert!(!listed.has_category(35));
    }

    #[test]
    fn test_validate_rejects_bad_score() {
        let mut bad = item(1, None);
        bad.vote_average = 11.0;
        assert!(bad.validate().is_err());
        bad.vote_average = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_query_result_validate_page_bounds() {
        let mut result = QueryResult {
            page: 2,
            items: vec![item(1, None)],
            total_pages: 1,
            total_items: 1,
        };
        assert!(result.validate().is_err());
        result.page = 1;
        assert!(result.validate().is_ok());
        assert!(!result.has_more());

        let empty: QueryResult<CatalogItem> = QueryResult::empty();
        assert!(empty.validate().is_ok());
        assert_eq!(empty.page, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_category_list_name_of() {
        let list: CategoryList =
            serde_json::from_str(r#"{"genres": [{"id": 28, "name": "Action"}]}"#)
                .expect("Failed to parse genres JSON");
        assert_eq!(list.name_of(28), Some("Action"));
        assert_eq!(list.name_of(99), None);
    }
}
