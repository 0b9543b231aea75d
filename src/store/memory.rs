//! In-process store.
//!
//! Interprets query plans directly over rows held in memory, including the
//! spatial predicate (evaluated with the geometry library, the way the
//! production stores evaluate theirs engine-side). Used by the test suites
//! and as the default store for a catalog booted without configuration.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use geo::Intersects;
use geo_types::Geometry;

use crate::geometry;
use crate::query::{Clause, ColumnMap, Param, QueryPlan, SpatialPredicate};

use super::errors::{StoreError, StoreResult};
use super::{Cell, RowSet, StoreExecutor};

/// A store backed by a vector of rows keyed by physical column name.
pub struct MemoryStore {
    columns: ColumnMap,
    max_limit: u32,
    rows: RwLock<Vec<HashMap<String, Cell>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new(columns: ColumnMap, max_limit: u32) -> Self {
        Self {
            columns,
            max_limit,
            rows: RwLock::new(Vec::new()),
            fail: false,
        }
    }

    /// A store whose every execution fails, for exercising the
    /// backend-unavailable path.
    pub fn failing(columns: ColumnMap, max_limit: u32) -> Self {
        Self {
            fail: true,
            ..Self::new(columns, max_limit)
        }
    }

    /// Inserts one row keyed by physical column names.
    pub fn insert(&self, row: HashMap<String, Cell>) {
        self.rows.write().expect("row lock poisoned").push(row);
    }

    fn matches(&self, row: &HashMap<String, Cell>, clause: &Clause) -> StoreResult<bool> {
        match clause {
            Clause::CategoryEq { column, value } | Clause::KeyEq { column, value } => {
                Ok(match (row.get(column.as_str()), value) {
                    (Some(Cell::Text(cell)), Param::Text(wanted)) => cell == wanted,
                    _ => false,
                })
            }
            Clause::SpatialIntersects { column, predicate } => {
                let stored = match row.get(column.as_str()) {
                    Some(cell) => decode_geometry(cell)?,
                    None => return Ok(false),
                };
                let probe = predicate_geometry(predicate)?;
                Ok(stored.intersects(&probe))
            }
            Clause::TimeRange {
                start_column,
                stop_column,
                start,
                stop,
            } => {
                let (row_start, row_stop) =
                    match (row.get(start_column.as_str()), row.get(stop_column.as_str())) {
                        (Some(Cell::Timestamp(a)), Some(Cell::Timestamp(b))) => (*a, *b),
                        _ => return Ok(false),
                    };
                let (Param::Timestamp(start), Param::Timestamp(stop)) = (start, stop) else {
                    return Ok(false);
                };
                Ok(row_start >= *start && row_stop <= *stop)
            }
        }
    }
}

fn decode_geometry(cell: &Cell) -> StoreResult<Geometry<f64>> {
    let result = match cell {
        Cell::Text(hex_wkb) => geometry::decode_wkb_hex(hex_wkb),
        Cell::Bytes(wkb) => geometry::decode_wkb(wkb),
        _ => {
            return Err(StoreError::Unavailable(
                "geometry column holds a non-geometry cell".into(),
            ))
        }
    };
    result.map_err(|e| StoreError::Unavailable(format!("stored geometry undecodable: {}", e)))
}

fn predicate_geometry(predicate: &SpatialPredicate) -> StoreResult<Geometry<f64>> {
    match predicate {
        SpatialPredicate::Envelope(bbox) => Ok(bbox.to_polygon()),
        SpatialPredicate::GeometryWkt(wkt) => geometry::parse_wkt(wkt)
            .map_err(|e| StoreError::Unavailable(format!("bad spatial predicate: {}", e))),
    }
}

fn cmp_cells(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    match (a, b) {
        (Some(Cell::Timestamp(a)), Some(Cell::Timestamp(b))) => a.cmp(b),
        (Some(Cell::Text(a)), Some(Cell::Text(b))) => a.cmp(b),
        (Some(Cell::Int(a)), Some(Cell::Int(b))) => a.cmp(b),
        (Some(Cell::Float(a)), Some(Cell::Float(b))) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl StoreExecutor for MemoryStore {
    fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    fn max_limit(&self) -> u32 {
        self.max_limit
    }

    async fn execute(&self, plan: &QueryPlan) -> StoreResult<RowSet> {
        if self.fail {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }

        let rows = self.rows.read().expect("row lock poisoned");

        let mut matched: Vec<&HashMap<String, Cell>> = Vec::new();
        for row in rows.iter() {
            let mut keep = true;
            for clause in &plan.clauses {
                if !self.matches(row, clause)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(row);
            }
        }

        matched.sort_by(|a, b| {
            for col in &plan.order_by {
                let ord = cmp_cells(a.get(col.as_str()), b.get(col.as_str()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let columns: Vec<String> = plan.select.iter().map(|c| c.physical.clone()).collect();
        let mut out = RowSet::new(columns.clone());
        for row in matched
            .into_iter()
            .skip(plan.offset as usize)
            .take(plan.effective_limit as usize)
        {
            out.rows.push(
                columns
                    .iter()
                    .map(|c| row.get(c.as_str()).cloned().unwrap_or(Cell::Null))
                    .collect(),
            );
        }
        Ok(out)
    }
}
