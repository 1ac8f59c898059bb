//! # Products
//!
//! The product record kind and the lenient numeric parsing applied to
//! client-supplied prices and stock counts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::seed::string_field;
use crate::store::{Normalize, Record, RecordId, StoreResult};

/// Category given to products created without one
pub const DEFAULT_CATEGORY: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,

    #[serde(default)]
    pub name: String,

    /// Business key; uniqueness is enforced by the route layer
    #[serde(default)]
    pub sku: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Unit price. Non-negativity is not enforced.
    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub stock: f64,
}

/// Fields of a new product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: f64,
    pub stock: f64,
}

/// Partial product update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}

impl Record for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;
    const KIND: &'static str = "products";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            sku: draft.sku,
            category: draft.category,
            price: draft.price,
            stock: draft.stock,
        }
    }

    fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
    }
}

impl Normalize for Product {
    fn normalize(id: RecordId, entry: &Map<String, Value>) -> StoreResult<Option<Self>> {
        Ok(Some(Product {
            id,
            name: string_field(entry, "name").unwrap_or_default(),
            sku: string_field(entry, "sku").unwrap_or_default(),
            category: string_field(entry, "category")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_category),
            price: entry.get("price").map_or(0.0, parse_price),
            stock: entry.get("stock").map_or(0.0, parse_stock),
        }))
    }
}

/// Parse a client-supplied price.
///
/// Numbers pass through. Strings are trimmed; a string containing a comma
/// is read in the local format where `.` groups thousands and `,` is the
/// decimal point (`"1.234,56"` is 1234.56). Anything unparseable is 0.
pub fn parse_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.contains(',') {
                parse_finite(&trimmed.replace('.', "").replacen(',', ".", 1))
            } else {
                parse_finite(trimmed)
            }
        }
        _ => 0.0,
    }
}

/// Parse a client-supplied stock count. Anything unparseable is 0.
pub fn parse_stock(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_finite(s.trim()),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn parse_finite(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&json!(150.5)), 150.5);
        assert_eq!(parse_price(&json!("99.99")), 99.99);
        assert_eq!(parse_price(&json!(" 12 ")), 12.0);
        assert_eq!(parse_price(&json!("1.234,56")), 1234.56);
        assert_eq!(parse_price(&json!("3,5")), 3.5);
        assert_eq!(parse_price(&json!("")), 0.0);
        assert_eq!(parse_price(&json!("abc")), 0.0);
        assert_eq!(parse_price(&json!("inf")), 0.0);
        assert_eq!(parse_price(&json!(null)), 0.0);
        assert_eq!(parse_price(&json!([1])), 0.0);
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock(&json!(5)), 5.0);
        assert_eq!(parse_stock(&json!("15")), 15.0);
        assert_eq!(parse_stock(&json!("")), 0.0);
        assert_eq!(parse_stock(&json!("many")), 0.0);
        assert_eq!(parse_stock(&json!(null)), 0.0);
    }

    #[test]
    fn test_patch_leaves_absent_fields() {
        let mut product = Product::from_draft(
            1,
            ProductDraft {
                name: "A".into(),
                sku: "X".into(),
                category: "Tools".into(),
                price: 10.0,
                stock: 2.0,
            },
        );

        product.apply(ProductPatch {
            name: Some("B".into()),
            ..Default::default()
        });

        assert_eq!(product.id, 1);
        assert_eq!(product.name, "B");
        assert_eq!(product.sku, "X");
        assert_eq!(product.category, "Tools");
        assert_eq!(product.price, 10.0);
    }

    #[test]
    fn test_normalize_legacy_entry() {
        let entry = json!({"name": "Cable", "sku": "C-1", "price": "9,99", "stock": "3"});
        let product = Product::normalize(7, entry.as_object().unwrap()).unwrap().unwrap();

        assert_eq!(product.id, 7);
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.price, 9.99);
        assert_eq!(product.stock, 3.0);
    }

    #[test]
    fn test_durable_shape_defaults() {
        let product: Product = serde_json::from_str(r#"{"id": 2, "name": "Pen"}"#).unwrap();
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.stock, 0.0);
    }
}
