//! SQL rendering for plan execution.
//!
//! Renders a `QueryPlan` into dialect-specific SQL text plus an ordered
//! parameter list. Filter scalars always become numbered placeholders;
//! the only values formatted into the text are physical column names from
//! the column map and the typed limit/offset integers.

use crate::filter::BoundingBox;
use crate::query::{Clause, Param, QueryPlan, SpatialPredicate};

/// Target dialect for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// PostGIS-flavored SQL for the relational store
    Postgres,
    /// SQL for the embedded analytical engine (geometry predicate is the
    /// registered `st_intersects(hex_wkb, wkt)` function)
    Analytics,
}

/// Rendered SQL text plus bound parameters in placeholder order.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<Param>,
}

/// Renders a plan for the given dialect.
pub fn render(plan: &QueryPlan, dialect: SqlDialect) -> SqlQuery {
    let mut text = String::with_capacity(256);
    let mut params: Vec<Param> = Vec::new();

    text.push_str("SELECT ");
    for (i, col) in plan.select.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        text.push_str(&col.physical);
    }
    text.push_str(" FROM ");
    text.push_str(&plan.relation);
    text.push_str(" WHERE TRUE");

    for clause in &plan.clauses {
        match clause {
            Clause::CategoryEq { column, value } | Clause::KeyEq { column, value } => {
                params.push(value.clone());
                text.push_str(&format!(" AND {} = ${}", column, params.len()));
            }
            Clause::SpatialIntersects { column, predicate } => {
                render_spatial(&mut text, &mut params, dialect, column, predicate);
            }
            Clause::TimeRange {
                start_column,
                stop_column,
                start,
                stop,
            } => {
                params.push(start.clone());
                text.push_str(&format!(" AND {} >= ${}", start_column, params.len()));
                params.push(stop.clone());
                text.push_str(&format!(" AND {} <= ${}", stop_column, params.len()));
            }
        }
    }

    if !plan.order_by.is_empty() {
        text.push_str(" ORDER BY ");
        text.push_str(&plan.order_by.join(", "));
    }

    text.push_str(&format!(" LIMIT {}", plan.effective_limit));
    if plan.offset > 0 {
        text.push_str(&format!(" OFFSET {}", plan.offset));
    }

    SqlQuery { text, params }
}

fn render_spatial(
    text: &mut String,
    params: &mut Vec<Param>,
    dialect: SqlDialect,
    column: &str,
    predicate: &SpatialPredicate,
) {
    match dialect {
        SqlDialect::Postgres => match predicate {
            SpatialPredicate::Envelope(bbox) => {
                params.push(Param::Float(bbox.min_lon));
                let p_min_lon = params.len();
                params.push(Param::Float(bbox.min_lat));
                let p_min_lat = params.len();
                params.push(Param::Float(bbox.max_lon));
                let p_max_lon = params.len();
                params.push(Param::Float(bbox.max_lat));
                let p_max_lat = params.len();
                text.push_str(&format!(
                    " AND ST_Intersects(ST_GeomFromWKB(decode({}, 'hex'), 4326), \
                     ST_MakeEnvelope(${}, ${}, ${}, ${}, 4326))",
                    column, p_min_lon, p_min_lat, p_max_lon, p_max_lat
                ));
            }
            SpatialPredicate::GeometryWkt(wkt) => {
                params.push(Param::Text(wkt.clone()));
                text.push_str(&format!(
                    " AND ST_Intersects(ST_GeomFromWKB(decode({}, 'hex'), 4326), \
                     ST_GeomFromText(${}, 4326))",
                    column,
                    params.len()
                ));
            }
        },
        SqlDialect::Analytics => {
            // The analytical engine's predicate takes the stored hex WKB and
            // a probe geometry in WKT; envelopes collapse to polygon WKT.
            let wkt = match predicate {
                SpatialPredicate::Envelope(bbox) => envelope_wkt(bbox),
                SpatialPredicate::GeometryWkt(wkt) => wkt.clone(),
            };
            params.push(Param::Text(wkt));
            text.push_str(&format!(
                " AND st_intersects({}, ${})",
                column,
                params.len()
            ));
        }
    }
}

fn envelope_wkt(bbox: &BoundingBox) -> String {
    crate::geometry::wkt_string(&bbox.to_polygon())
}
