//! The expanded detail record for a single catalog item.

use serde::{Deserialize, Serialize};

use super::item::CatalogItem;

/// Cast entries kept per detail record.
pub const MAX_CAST_MEMBERS: usize = 10;

/// A playable trailer reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    pub key: String,
    pub name: String,
    pub site: String,
}

impl Trailer {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
}

/// A catalog item fetched by id, with categories, trailer and cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDetail {
    pub item: CatalogItem,
    pub trailer: Option<Trailer>,
    pub cast: Vec<CastMember>,
}

impl CatalogDetail {
    /// Category names joined for display, e.g. "Action, Crime".
    pub fn category_names(&self) -> String {
        self.item
            .categories
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
