//! # Inventory Module
//!
//! Product records and the stock-value report computed over them.

pub mod product;
pub mod report;

pub use product::{parse_price, parse_stock, Product, ProductDraft, ProductPatch};
pub use report::{summarize, StockSummary};
