//! # Stock Report
//!
//! Read-only aggregation over the product collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Stock totals per category plus the overall inventory value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    /// Category name to summed stock
    pub by_category: BTreeMap<String, f64>,

    /// Sum of `stock * price` over every product
    pub total_value: f64,
}

/// Fold the products into a [`StockSummary`].
///
/// Every product contributes, zero-stock ones included; no rounding is
/// applied.
pub fn summarize<'a, I>(products: I) -> StockSummary
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .fold(StockSummary::default(), |mut summary, product| {
            *summary
                .by_category
                .entry(product.category.clone())
                .or_insert(0.0) += product.stock;
            summary.total_value += product.stock * product.price;
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category: &str, price: f64, stock: f64) -> Product {
        Product {
            id: 1,
            name: "item".into(),
            sku: "SKU".into(),
            category: category.into(),
            price,
            stock,
        }
    }

    #[test]
    fn test_empty_collection() {
        let summary = summarize(&[] as &[Product]);
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.total_value, 0.0);
    }

    #[test]
    fn test_same_category_accumulates() {
        let products = [product("A", 100.0, 5.0), product("A", 200.0, 2.0)];
        let summary = summarize(&products);

        assert_eq!(summary.by_category, BTreeMap::from([("A".to_string(), 7.0)]));
        assert_eq!(summary.total_value, 900.0);
    }

    #[test]
    fn test_multiple_categories() {
        let products = [
            product("Computo", 1000.0, 2.0),
            product("Accesorios", 25.0, 10.0),
            product("Accesorios", 75.0, 5.0),
        ];
        let summary = summarize(&products);

        assert_eq!(summary.by_category["Computo"], 2.0);
        assert_eq!(summary.by_category["Accesorios"], 15.0);
        assert_eq!(summary.total_value, 2625.0);
    }

    #[test]
    fn test_zero_stock_contributes_nothing() {
        let products = [product("Computo", 100.0, 0.0), product("Computo", 200.0, 3.0)];
        let summary = summarize(&products);

        assert_eq!(summary.by_category["Computo"], 3.0);
        assert_eq!(summary.total_value, 600.0);
    }

    #[test]
    fn test_decimal_prices() {
        let products = [product("Accesorios", 9.99, 3.0), product("Accesorios", 199.99, 1.0)];
        let summary = summarize(&products);

        assert_eq!(summary.by_category["Accesorios"], 4.0);
        assert!((summary.total_value - 229.96).abs() < 0.005);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(summarize(&[product("A", 1.0, 1.0)])).unwrap();
        assert!(json.get("byCategory").is_some());
        assert!(json.get("totalValue").is_some());
    }
}
