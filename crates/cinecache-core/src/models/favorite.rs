//! Favorite snapshots.

use serde::{Deserialize, Serialize};

use super::item::CatalogItem;

/// The display fields of an item, copied at the moment it was favorited.
///
/// A snapshot is never refreshed from the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
}

impl From<&CatalogItem> for FavoriteItem {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
            backdrop_path: item.backdrop_path.clone(),
            release_date: item.release_date.clone(),
            vote_average: item.vote_average,
            overview: item.overview.clone(),
        }
    }
}

impl FavoriteItem {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.get(..4).and_then(|y| y.parse().ok())
    }
}
