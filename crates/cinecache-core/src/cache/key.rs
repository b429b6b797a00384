use std::fmt;

/// Longest escaped search term kept verbatim in a file stem. Longer terms
/// are replaced by a digest so file names stay well under 255 bytes.
const MAX_ESCAPED_TERM_LEN: usize = 96;

/// Hex digits of the term digest used in place of a long term
const TERM_DIGEST_LEN: usize = 32;

/// Identity of one cacheable query: the query kind plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Trending,
    Search { term: String, page: u32 },
    Detail(u64),
    Categories,
}

impl CacheKey {
    /// Search key with the term trimmed, so `" batman "` and `"batman"`
    /// share an entry.
    pub fn search(term: &str, page: u32) -> Self {
        CacheKey::Search {
            term: term.trim().to_string(),
            page,
        }
    }

    /// File stem used by the disk cache. Distinct keys map to distinct
    /// stems; bytes outside `[A-Za-z0-9]` in a search term are hex-escaped.
    /// Terms too long to escape get `~` followed by a blake3 digest, which
    /// no escaped term can contain.
    pub fn file_stem(&self) -> String {
        match self {
            CacheKey::Trending => "trending".to_string(),
            CacheKey::Categories => "categories".to_string(),
            CacheKey::Detail(id) => format!("detail_{}", id),
            CacheKey::Search { term, page } => {
                let mut escaped = String::with_capacity(term.len());
                for byte in term.bytes() {
                    if byte.is_ascii_alphanumeric() {
                        escaped.push(byte as char);
                    } else {
                        escaped.push_str(&format!("%{:02x}", byte));
                    }
                }
                if escaped.len() > MAX_ESCAPED_TERM_LEN {
                    let digest = blake3::hash(term.as_bytes()).to_hex();
                    escaped = format!("~{}", &digest[..TERM_DIGEST_LEN]);
                }
                format!("search_{}_{}", escaped, page)
            }
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Trending => write!(f, "trending"),
            CacheKey::Categories => write!(f, "categories"),
            CacheKey::Detail(id) => write!(f, "detail({})", id),
            CacheKey::Search { term, page } => write!(f, "search({:?}, page {})", term, page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_trims_term() {
        assert_eq!(CacheKey::search("  batman ", 1), CacheKey::search("batman", 1));
        assert_ne!(CacheKey::search("batman", 1), CacheKey::search("batman", 2));
        assert_ne!(CacheKey::search("Batman", 1), CacheKey::search("batman", 1));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(CacheKey::Trending.file_stem(), "trending");
        assert_eq!(CacheKey::Detail(155).file_stem(), "detail_155");
        assert_eq!(CacheKey::search("dark knight", 2).file_stem(), "search_dark%20knight_2");
        assert_eq!(CacheKey::search("a/b", 1).file_stem(), "search_a%2fb_1");
        assert_ne!(
            CacheKey::search("a_1", 1).file_stem(),
            CacheKey::search("a", 11).file_stem()
        );
    }

    #[test]
    fn test_long_term_stem_is_bounded() {
        let long = "x".repeat(300);
        let stem = CacheKey::search(&long, 1).file_stem();
        assert!(stem.len() < 64, "stem too long: {}", stem);
        assert!(stem.starts_with("search_~"));
        assert_eq!(stem, CacheKey::search(&long, 1).file_stem());
        assert_ne!(stem, CacheKey::search(&"x".repeat(301), 1).file_stem());

        // Every non-ASCII byte escapes to three characters
        let accented = "é".repeat(20);
        assert!(CacheKey::search(&accented, 2).file_stem().starts_with("search_~"));
        assert!(!CacheKey::search("é", 2).file_stem().contains('~'));
    }
}
