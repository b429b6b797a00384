//! Client-side category filtering of a result page.

use crate::models::CatalogItem;

/// Narrow `items` to those tagged with `category`.
///
/// `None` keeps every item in order. Items without list-shaped category
/// ids are dropped by any `Some` filter.
pub fn filter_by_category(items: &[CatalogItem], category: Option<u32>) -> Vec<&CatalogItem> {
    match category {
        None => items.iter().collect(),
        Some(id) => items.iter().filter(|item| item.has_category(id)).collect(),
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

    fn ids(items: &[&CatalogItem]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    fn sample() -> Vec<CatalogItem> {
        vec![
            item(3, Some(vec![28, 12])),
            item(1, Some(vec![18])),
            item(2, None),
            item(5, Some(vec![])),
            item(4, Some(vec![28])),
        ]
    }

    #[test]
    fn test_no_filter_is_identity() {
        let items = sample();
        assert_eq!(ids(&filter_by_category(&items, None)), vec![3, 1, 2, 5, 4]);
        assert!(filter_by_category(&[], None).is_empty());
    }

    #[test]
    fn test_filter_keeps_matching_in_order() {
        let items = sample();
        assert_eq!(ids(&filter_by_category(&items, Some(28))), vec![3, 4]);
        assert_eq!(ids(&filter_by_category(&items, Some(18))), vec![1]);
        assert!(filter_by_category(&items, Some(99)).is_empty());
    }

    #[test]
    fn test_items_without_categories_never_match() {
        let items = vec![item(1, None), item(2, Some(vec![]))];
        for category in [0, 18, 28, u32::MAX] {
            assert!(filter_by_category(&items, Some(category)).is_empty());
        }
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let items = sample();
        let before: Vec<u64> = items.iter().map(|i| i.id).collect();
        let _ = filter_by_category(&items, Some(28));
        let after: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(before, after);
    }
}
