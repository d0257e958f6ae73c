//! Client-side filtering and sorting of the product listing.
//!
//! The backend returns the whole catalog in one response, so browsing
//! filters run locally over the cached list.

use lifestyle_store_core::Money;

use crate::api::types::Product;

/// Product list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Default,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest rated first.
    Rating,
    /// New arrivals first.
    Newest,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::PriceLow => write!(f, "price-low"),
            Self::PriceHigh => write!(f, "price-high"),
            Self::Rating => write!(f, "rating"),
            Self::Newest => write!(f, "newest"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            "newest" => Ok(Self::Newest),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Filter and sort options for browsing products.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Keep products in any of these categories; empty keeps all.
    pub categories: Vec<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl ProductQuery {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    /// Filter then sort `products`. Ties keep their listing order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut result: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();

        match self.sort {
            SortOrder::Default => {}
            SortOrder::PriceLow => result.sort_by_key(|p| p.price),
            SortOrder::PriceHigh => result.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Rating => result.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            SortOrder::Newest => result.sort_by_key(|p| !p.is_new),
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::models::cart::tests::product;

    fn catalog() -> Vec<Product> {
        let mut items = vec![
            product(1, 4990),
            product(2, 1299),
            product(3, 8800),
            product(4, 1299),
        ];
        items[0].name = "Bamboo Tray".to_string();
        items[0].category = "kitchen".to_string();
        items[0].rating = 4.1;
        items[1].name = "Linen Napkin".to_string();
        items[1].category = "kitchen".to_string();
        items[1].rating = 4.8;
        items[1].is_new = true;
        items[2].name = "Wool Throw".to_string();
        items[2].rating = 4.8;
        items[3].name = "Ceramic Mug".to_string();
        items[3].is_new = true;
        items
    }

    fn ids(products: &[&Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_default_query_keeps_everything_in_order() {
        let products = catalog();
        assert_eq!(ids(&ProductQuery::default().apply(&products)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_category_and_price_filters() {
        let products = catalog();
        let query = ProductQuery {
            categories: vec!["kitchen".to_string()],
            max_price: Some(Money::from_cents(4990)),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec![1, 2]);

        let query = ProductQuery {
            min_price: Some(Money::from_cents(1299)),
            max_price: Some(Money::from_cents(1299)),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec![2, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let products = catalog();
        let query = ProductQuery {
            search: Some("  LINEN ".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec![2]);
    }

    #[test]
    fn test_sorts_are_stable() {
        let products = catalog();
        let sorted = |sort: SortOrder| {
            ids(&ProductQuery {
                sort,
                ..ProductQuery::default()
            }
            .apply(&products))
        };

        assert_eq!(sorted(SortOrder::PriceLow), vec![2, 4, 1, 3]);
        assert_eq!(sorted(SortOrder::PriceHigh), vec![3, 1, 2, 4]);
        assert_eq!(sorted(SortOrder::Rating), vec![2, 3, 4, 1]);
        assert_eq!(sorted(SortOrder::Newest), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_order_parses() {
        for name in ["default", "price-low", "price-high", "rating", "newest"] {
            assert_eq!(name.parse::<SortOrder>().unwrap().to_string(), name);
        }
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
