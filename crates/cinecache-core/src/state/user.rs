use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::{CatalogItem, FavoriteItem, Preferences, ViewMode};
use crate::storage::{KeyValueStore, StorageError};

/// Record holding the JSON array of favorite snapshots
pub const FAVORITES_KEY: &str = "favorites";

/// Record holding the raw last search term
pub const LAST_SEARCH_KEY: &str = "lastSearch";

/// Record holding `grid` or `list`
pub const VIEW_MODE_KEY: &str = "viewMode";

/// Favorites and preferences, loaded once and written through on every
/// mutation.
///
/// Each mutator writes the new record first and only then updates memory,
/// so a failed write leaves both sides on the previous value.
pub struct UserState<S: KeyValueStore> {
    store: S,
    favorites: Vec<FavoriteItem>,
    preferences: Preferences,
}

impl<S: KeyValueStore> UserState<S> {
    /// Read all records from `store`.
    ///
    /// Missing records get their defaults. Unreadable or malformed records
    /// are logged and also get their defaults; one bad record does not
    /// reset the others.
    pub fn load(store: S) -> Self {
        let favorites = Self::load_favorites(&store);
        let last_search_term = Self::read_record(&store, LAST_SEARCH_KEY).unwrap_or_default();
        let view_mode = Self::read_record(&store, VIEW_MODE_KEY)
            .and_then(|raw| match raw.parse::<ViewMode>() {
                Ok(mode) => Some(mode),
                Err(reason) => {
                    warn!(record = VIEW_MODE_KEY, %reason, "Ignoring malformed record");
                    None
                }
            })
            .unwrap_or_default();

        info!(
            favorites = favorites.len(),
            view_mode = %view_mode,
            "User state loaded"
        );

        Self {
            store,
            favorites,
            preferences: Preferences {
                last_search_term,
                view_mode,
            },
        }
    }

    fn read_record(store: &S, key: &str) -> Option<String> {
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(record = key, error = %e, "Failed to read record, using default");
                None
            }
        }
    }

    fn load_favorites(store: &S) -> Vec<FavoriteItem> {
        let Some(raw) = Self::read_record(store, FAVORITES_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<FavoriteItem>>(&raw) {
            Ok(mut favorites) => {
                // Earlier writers could append the same id twice
                let mut seen = std::collections::HashSet::new();
                favorites.retain(|f| seen.insert(f.id));
                favorites
            }
            Err(e) => {
                let err = StorageError::Malformed {
                    key: FAVORITES_KEY.to_string(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "Ignoring malformed favorites");
                Vec::new()
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.write_raw(key, &encoded)
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value).inspect_err(|e| {
            error!(record = key, error = %e, "Failed to persist record");
        })
    }

    // ===== Favorites =====

    pub fn favorites(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|f| f.id == id)
    }

    /// Store a snapshot of `item`. Returns `Ok(false)` if it was already a
    /// favorite; the existing snapshot is kept as is.
    pub fn add_favorite(&mut self, item: &CatalogItem) -> Result<bool, StorageError> {
        if self.is_favorite(item.id) {
            return Ok(false);
        }

        let mut updated = self.favorites.clone();
        updated.push(FavoriteItem::from(item));
        self.write(FAVORITES_KEY, &updated)?;
        self.favorites = updated;
        debug!(id = item.id, "Favorite added");
        Ok(true)
    }

    /// Returns `Ok(false)` if `id` was not a favorite.
    pub fn remove_favorite(&mut self, id: u64) -> Result<bool, StorageError> {
        if !self.is_favorite(id) {
            return Ok(false);
        }

        let updated: Vec<FavoriteItem> = self
            .favorites
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();
        self.write(FAVORITES_KEY, &updated)?;
        self.favorites = updated;
        debug!(id = id, "Favorite removed");
        Ok(true)
    }

    /// Add or remove `item`; returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, item: &CatalogItem) -> Result<bool, StorageError> {
        if self.is_favorite(item.id) {
            self.remove_favorite(item.id)?;
            Ok(false)
        } else {
            self.add_favorite(item)?;
            Ok(true)
        }
    }

    // ===== Preferences =====

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn last_search_term(&self) -> &str {
        &self.preferences.last_search_term
    }

    pub fn view_mode(&self) -> ViewMode {
        self.preferences.view_mode
    }

    pub fn set_last_search_term(&mut self, term: &str) -> Result<(), StorageError> {
        self.write_raw(LAST_SEARCH_KEY, term)?;
        self.preferences.last_search_term = term.to_string();
        Ok(())
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), StorageError> {
        self.write_raw(VIEW_MODE_KEY, mode.as_str())?;
        self.preferences.view_mode = mode;
        Ok(())
    }

    pub fn toggle_view_mode(&mut self) -> Result<ViewMode, StorageError> {
        let mode = self.preferences.view_mode.toggled();
        self.set_view_mode(mode)?;
        Ok(mode)
    }

    /// Hand back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}

// ============================================================================
// Tests
// ============================================================================
