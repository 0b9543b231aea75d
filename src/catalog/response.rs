//! Response envelope.

use serde::Serialize;

use super::product::Product;

/// One served page: item count, mapped products, and the next cursor.
/// Constructed once per request and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub total_count: usize,
    pub products: Vec<Product>,
    pub next: Option<String>,
}

impl PageResult {
    pub fn new(products: Vec<Product>, next: Option<String>) -> Self {
        let total_count = products.len();
        Self {
            total_count,
            products,
            next,
        }
    }
}
