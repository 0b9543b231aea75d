//! Query construction.
//!
//! Shared by every route: one builder, parameterized by a per-store column
//! map, replaces the per-route filter/pagination copies the service grew
//! out of. Plans carry bound parameter values only; no user-supplied text
//! ever lands in rendered query strings.

mod builder;
mod columns;
mod errors;
mod plan;

pub use builder::QueryBuilder;
pub use columns::{ColumnMap, SelectColumn, CANONICAL_FIELDS};
pub use errors::{QueryError, QueryResult};
pub use plan::{Clause, Param, QueryPlan, SpatialPredicate};
