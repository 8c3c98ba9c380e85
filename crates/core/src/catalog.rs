//! Filtering and sorting of product lists fetched in full from the backend.
//!
//! Pages fetch up to [`LIST_FETCH_LIMIT`] items and narrow them locally with
//! a [`ProductFilter`]. Every predicate treats an empty selection as "all".

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::types::{CollectionId, Price, Product, ProductId};

/// How many items a list page asks the backend for.
pub const LIST_FETCH_LIMIT: u32 = 100;

/// Default upper bound of the price filter, in Toman.
pub const DEFAULT_MAX_PRICE: i64 = 10_000_000;

/// How many related products the product page shows.
pub const RELATED_LIMIT: usize = 4;

/// Sort order of a product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Featured products first, otherwise server order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Keep the order the backend returned.
    Server,
}

impl SortKey {
    /// Parse a query-string sort key; unknown keys keep server order.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key {
            "featured" => Self::Featured,
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            _ => Self::Server,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Server => "newest",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::Featured => b.featured.cmp(&a.featured),
            Self::Server => Ordering::Equal,
        }
    }
}

/// Predicates and sort applied to a fetched product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub min_price: Price,
    pub max_price: Price,
    pub categories: Vec<String>,
    pub collections: Vec<CollectionId>,
    pub section: Option<String>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            min_price: Price::ZERO,
            max_price: Price::new(Decimal::from(DEFAULT_MAX_PRICE)),
            categories: Vec::new(),
            collections: Vec::new(),
            section: None,
            search: None,
            sort: SortKey::default(),
        }
    }
}

impl ProductFilter {
    /// Whether a product passes every predicate. Price bounds are inclusive.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let in_price = product.price >= self.min_price && product.price <= self.max_price;

        let in_category =
            self.categories.is_empty() || self.categories.iter().any(|c| *c == product.category);

        let in_collection = self.collections.is_empty()
            || product
                .collection_key()
                .is_some_and(|id| self.collections.contains(id));

        let in_section = self
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .is_none_or(|s| s == product.section);

        let matches_text = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .is_none_or(|needle| {
                let needle = needle.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            });

        in_price && in_category && in_collection && in_section && matches_text
    }

    /// Filter then stable-sort a fetched list.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut filtered: Vec<Product> =
            products.into_iter().filter(|p| self.matches(p)).collect();
        let sort = self.sort;
        filtered.sort_by(|a, b| sort.compare(a, b));
        filtered
    }

    /// Whether any predicate narrows the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let defaults = Self::default();
        self.min_price != defaults.min_price
            || self.max_price != defaults.max_price
            || !self.categories.is_empty()
            || !self.collections.is_empty()
            || self.section.as_deref().is_some_and(|s| !s.is_empty())
            || self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Distinct non-empty categories in first-seen order.
#[must_use]
pub fn unique_categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter(|p| !p.category.is_empty())
        .filter(|p| seen.insert(p.category.as_str()))
        .map(|p| p.category.clone())
        .collect()
}

/// Products related to `product_id`: same category first, then the rest.
#[must_use]
pub fn related_products<'a>(
    products: &'a [Product],
    product_id: &ProductId,
    limit: usize,
) -> Vec<&'a Product> {
    let Some(current) = products.iter().find(|p| &p.id == product_id) else {
        return products.iter().take(limit).collect();
    };

    related_to(products, current, limit)
}

/// Same as [`related_products`] when the current product comes from elsewhere.
#[must_use]
pub fn related_to<'a>(
    products: &'a [Product],
    current: &Product,
    limit: usize,
) -> Vec<&'a Product> {
    let (same, rest): (Vec<&Product>, Vec<&Product>) = products
        .iter()
        .filter(|p| p.id != current.id)
        .partition(|p| !current.category.is_empty() && p.category == current.category);

    same.into_iter().chain(rest).take(limit).collect()
}

/// Number of pages: the server's `totalPages`, else ceil(total / per page), else 1.
#[must_use]
pub fn total_pages(reported: Option<u32>, total: Option<u64>, per_page: u32) -> u32 {
    if let Some(pages) = reported.filter(|p| *p > 0) {
        return pages;
    }
    match total {
        Some(total) if per_page > 0 && total > 0 => {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        }
        _ => 1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn product(id: &str, price: i64, category: &str, featured: bool) -> Product {
        serde_json::from_value(json!({
            "_id": id,
            "name": format!("Product {id}"),
            "description": "چوب گردو",
            "price": price,
            "category": category,
            "featured": featured,
            "collection": {"_id": format!("col-{category}")},
            "section": "living"
        }))
        .unwrap()
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", 500_000, "lighting", false),
            product("b", 2_000_000, "sofa", true),
            product("c", 10_000_000, "lighting", false),
            product("d", 0, "table", true),
        ]
    }

    #[test]
    fn test_default_filter_passes_everything_with_inclusive_bounds() {
        let filter = ProductFilter {
            sort: SortKey::Server,
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec!["a", "b", "c", "d"]);
        assert!(!filter.is_active());
    }

    #[test]
    fn test_price_range() {
        let filter = ProductFilter {
            min_price: Price::toman(500_000),
            max_price: Price::toman(2_000_000),
            sort: SortKey::Server,
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec!["a", "b"]);
        assert!(filter.is_active());
    }

    #[test]
    fn test_category_and_collection() {
        let filter = ProductFilter {
            categories: vec!["lighting".into()],
            sort: SortKey::Server,
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec!["a", "c"]);

        let filter = ProductFilter {
            collections: vec![CollectionId::new("col-sofa")],
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec!["b"]);
    }

    #[test]
    fn test_section_and_search() {
        let filter = ProductFilter {
            section: Some("bedroom".into()),
            ..ProductFilter::default()
        };
        assert!(filter.apply(catalog()).is_empty());

        let filter = ProductFilter {
            search: Some("PRODUCT C".into()),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec!["c"]);

        let filter = ProductFilter {
            search: Some("گردو".into()),
            sort: SortKey::Server,
            ..ProductFilter::default()
        };
        assert_eq!(filter.apply(catalog()).len(), 4);
    }

    #[test]
    fn test_sort_keys() {
        let sorted = |sort: SortKey| {
            let filter = ProductFilter {
                sort,
                ..ProductFilter::default()
            };
            ids(&filter.apply(catalog()))
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };
        assert_eq!(sorted(SortKey::PriceAsc), vec!["d", "a", "b", "c"]);
        assert_eq!(sorted(SortKey::PriceDesc), vec!["c", "b", "a", "d"]);
        // stable: featured keep relative order, then the rest
        assert_eq!(sorted(SortKey::Featured), vec!["b", "d", "a", "c"]);
        assert_eq!(sorted(SortKey::Server), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("price-asc"), SortKey::PriceAsc);
        assert_eq!(SortKey::parse("newest"), SortKey::Server);
        assert_eq!(SortKey::parse(""), SortKey::Server);
    }

    #[test]
    fn test_unique_categories_first_seen() {
        assert_eq!(unique_categories(&catalog()), vec!["lighting", "sofa", "table"]);
    }

    #[test]
    fn test_related_products_prefers_category() {
        let products = catalog();
        let related = related_products(&products, &ProductId::new("a"), 2);
        let related: Vec<&str> = related.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(related, vec!["c", "b"]);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(Some(7), Some(10), 10), 7);
        assert_eq!(total_pages(None, Some(21), 10), 3);
        assert_eq!(total_pages(None, Some(0), 10), 1);
        assert_eq!(total_pages(None, None, 10), 1);
    }
}
