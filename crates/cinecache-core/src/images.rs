//! Image URL resolution.
//!
//! Items carry opaque image paths; URLs are built only at display time
//! and never cached.

/// Default base URL for catalog images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Shown when an item has no image
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "w1280";
pub const PROFILE_SIZE: &str = "w185";

#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL)
    }
}

impl ImageResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL for `path` at `size`, or the placeholder when there is no path.
    pub fn resolve(&self, path: Option<&str>, size: &str) -> String {
        match path {
            Some(p) if !p.is_empty() => format!("{}/{}{}", self.base_url, size, p),
            _ => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn poster_url(&self, path: Option<&str>) -> String {
        self.resolve(path, POSTER_SIZE)
    }

    pub fn backdrop_url(&self, path: Option<&str>) -> String {
        self.resolve(path, BACKDROP_SIZE)
    }

    pub fn profile_url(&self, path: Option<&str>) -> String {
        self.resolve(path, PROFILE_SIZE)
    }
}
