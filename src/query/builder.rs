//! Query plan construction.
//!
//! Turns a validated `FilterSet` into a `QueryPlan` bound to one store's
//! column names. Construction is deterministic: clauses are appended in the
//! fixed order categorical → spatial → temporal, so the same filters always
//! produce the same plan and cache keys built from the request stay stable.

use crate::filter::{FilterSet, SpatialFilter};
use crate::geometry;

use super::columns::ColumnMap;
use super::errors::{QueryError, QueryResult};
use super::plan::{Clause, Param, QueryPlan, SpatialPredicate};

/// Builds store-targeted query plans from validated filter sets.
pub struct QueryBuilder<'a> {
    columns: &'a ColumnMap,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self { columns }
    }

    /// Builds the plan for a filtered, paginated listing.
    ///
    /// The effective limit is decided here, exactly once: a `num` cap below
    /// the page size shrinks the page, and the recorded value is what the
    /// pagination planner later reuses. The offset clause always carries the
    /// original offset, never a value derived from the limit.
    pub fn build(&self, filters: &FilterSet) -> QueryResult<QueryPlan> {
        let mut clauses = Vec::with_capacity(3);

        if let Some(collection) = &filters.collection {
            clauses.push(Clause::CategoryEq {
                column: self.columns.category.clone(),
                value: Param::Text(collection.clone()),
            });
        }

        if let Some(spatial) = &filters.spatial {
            clauses.push(Clause::SpatialIntersects {
                column: self.columns.geometry.clone(),
                predicate: self.spatial_predicate(spatial)?,
            });
        }

        if let Some(window) = &filters.window {
            if window.start > window.stop {
                return Err(QueryError::InvalidTimeRange {
                    start: window.start.to_string(),
                    stop: window.stop.to_string(),
                });
            }
            clauses.push(Clause::TimeRange {
                start_column: self.columns.start.clone(),
                stop_column: self.columns.stop.clone(),
                start: Param::Timestamp(window.start),
                stop: Param::Timestamp(window.stop),
            });
        }

        let effective_limit = match filters.num {
            Some(num) if num < filters.limit => num,
            _ => filters.limit,
        };

        Ok(QueryPlan {
            relation: self.columns.relation.clone(),
            select: self.columns.select.clone(),
            clauses,
            order_by: vec![self.columns.start.clone(), self.columns.id.clone()],
            effective_limit,
            offset: filters.offset,
        })
    }

    /// Builds the plan for a single-item lookup by composite key.
    pub fn build_item_lookup(&self, collection: &str, item_id: &str) -> QueryPlan {
        QueryPlan {
            relation: self.columns.relation.clone(),
            select: self.columns.select.clone(),
            clauses: vec![
                Clause::CategoryEq {
                    column: self.columns.category.clone(),
                    value: Param::Text(collection.to_string()),
                },
                Clause::KeyEq {
                    column: self.columns.id.clone(),
                    value: Param::Text(item_id.to_string()),
                },
            ],
            order_by: vec![self.columns.start.clone(), self.columns.id.clone()],
            effective_limit: 1,
            offset: 0,
        }
    }

    /// Normalizes the validated spatial filter into a store predicate.
    ///
    /// WKT re-parses here even though the validator already checked it:
    /// a failure at this point means the upstream guarantee was broken and
    /// is reported as an internal inconsistency, not a client error.
    fn spatial_predicate(&self, spatial: &SpatialFilter) -> QueryResult<SpatialPredicate> {
        match spatial {
            SpatialFilter::Bbox(bbox) => Ok(SpatialPredicate::Envelope(*bbox)),
            SpatialFilter::Wkt(text) => {
                let geom = geometry::parse_wkt(text).map_err(|e| {
                    QueryError::Internal(format!(
                        "validated geometry failed to parse: {}",
                        e
                    ))
                })?;
                Ok(SpatialPredicate::GeometryWkt(geometry::wkt_string(&geom)))
            }
        }
    }
}
