//! Backing-store executors.
//!
//! The query core is store-agnostic above the `StoreExecutor` seam. Three
//! realizations exist: an async relational session (`PostgresStore`), an
//! embedded analytical engine over columnar files (`AnalyticsStore`), and
//! an in-process store used by tests (`MemoryStore`).
//!
//! Every executor treats its connection as a request-scoped resource:
//! acquired inside `execute`, released on every exit path.

mod analytics;
mod errors;
mod memory;
mod postgres;
pub mod sql;

pub use analytics::AnalyticsStore;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::query::{ColumnMap, QueryPlan};

/// One cell of a raw store row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

/// Raw rows as returned by a store: physical column names plus one cell
/// vector per row, in store-returned order.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of a physical column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A backing-store query executor.
///
/// Implementations receive the structured plan and are responsible for
/// their own textual/bound-parameter form; the core never sees SQL.
#[async_trait]
pub trait StoreExecutor: Send + Sync {
    /// The store's logical-to-physical column mapping.
    fn columns(&self) -> &ColumnMap;

    /// Store-specific upper bound on page size.
    fn max_limit(&self) -> u32;

    /// Executes a plan, returning raw rows plus column names.
    async fn execute(&self, plan: &QueryPlan) -> StoreResult<RowSet>;
}
