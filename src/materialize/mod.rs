//! Row materialization.
//!
//! Normalizes heterogeneous store rows (hex vs binary geometry, NaN
//! sentinels, differing physical column names) into canonical items. Every
//! expected canonical field must be present in the row set; a missing or
//! malformed column fails the whole request rather than producing a
//! partially mapped page. Store-returned row order is preserved.

mod errors;

pub use errors::{MaterializeError, MaterializeResult};

use chrono::NaiveDateTime;
use geo_types::Geometry;

use crate::filter;
use crate::query::ColumnMap;
use crate::store::{Cell, RowSet};

/// A normalized catalog record: identifier, decoded footprint, and the
/// fixed scalar field list. Absent and NaN scalars are `None`, never a
/// store-specific sentinel.
#[derive(Debug, Clone)]
pub struct CanonicalItem {
    pub id: String,
    pub geometry: Geometry<f64>,
    pub satellite_name: Option<String>,
    pub acquisition_start_utc: Option<NaiveDateTime>,
    pub acquisition_end_utc: Option<NaiveDateTime>,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub orbit_direction: Option<String>,
    pub polarization: Option<String>,
    pub product_level: Option<String>,
    pub processing_time: Option<NaiveDateTime>,
    pub assets: Option<String>,
}

/// Materializes raw rows against one store's column map.
pub struct Materializer<'a> {
    columns: &'a ColumnMap,
}

impl<'a> Materializer<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self { columns }
    }

    /// Converts every row or fails; never returns a partial sequence.
    pub fn materialize(&self, rows: &RowSet) -> MaterializeResult<Vec<CanonicalItem>> {
        let index = FieldIndex::resolve(self.columns, rows)?;
        let mut items = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.rows.iter().enumerate() {
            if row.len() != rows.columns.len() {
                return Err(MaterializeError::SchemaMismatch(format!(
                    "row {} has {} cells for {} columns",
                    row_idx,
                    row.len(),
                    rows.columns.len()
                )));
            }
            items.push(index.item_from(row, row_idx)?);
        }
        Ok(items)
    }
}

/// Resolved cell indexes for every canonical field.
struct FieldIndex {
    id: usize,
    geometry: usize,
    satellite_name: usize,
    acquisition_start_utc: usize,
    acquisition_end_utc: usize,
    center_lat: usize,
    center_lon: usize,
    orbit_direction: usize,
    polarization: usize,
    product_level: usize,
    processing_time: usize,
    assets: usize,
}

impl FieldIndex {
    fn resolve(columns: &ColumnMap, rows: &RowSet) -> MaterializeResult<Self> {
        let find = |logical: &str| -> MaterializeResult<usize> {
            let physical = columns.physical(logical).ok_or_else(|| {
                MaterializeError::SchemaMismatch(format!(
                    "column map has no mapping for '{}'",
                    logical
                ))
            })?;
            rows.column_index(physical).ok_or_else(|| {
                MaterializeError::SchemaMismatch(format!(
                    "store did not return expected column '{}'",
                    physical
                ))
            })
        };

        Ok(Self {
            id: find("product_name")?,
            geometry: find("bounding_box_wkb")?,
            satellite_name: find("satellite_name")?,
            acquisition_start_utc: find("acquisition_start_utc")?,
            acquisition_end_utc: find("acquisition_end_utc")?,
            center_lat: find("center_lat")?,
            center_lon: find("center_lon")?,
            orbit_direction: find("orbit_direction")?,
            polarization: find("polarization")?,
            product_level: find("product_level")?,
            processing_time: find("processing_time")?,
            assets: find("assets")?,
        })
    }

    fn item_from(&self, row: &[Cell], row_idx: usize) -> MaterializeResult<CanonicalItem> {
        let id = match &row[self.id] {
            Cell::Text(v) if !v.is_empty() => v.clone(),
            other => {
                return Err(MaterializeError::SchemaMismatch(format!(
                    "row {} has no usable identifier (got {:?})",
                    row_idx, other
                )))
            }
        };

        let geometry = match &row[self.geometry] {
            Cell::Text(hex_wkb) => crate::geometry::decode_wkb_hex(hex_wkb)?,
            Cell::Bytes(wkb) => crate::geometry::decode_wkb(wkb)?,
            other => {
                return Err(MaterializeError::SchemaMismatch(format!(
                    "row {} geometry column holds {:?}",
                    row_idx, other
                )))
            }
        };

        Ok(CanonicalItem {
            id,
            geometry,
            satellite_name: text_field(&row[self.satellite_name]),
            acquisition_start_utc: time_field(&row[self.acquisition_start_utc], row_idx)?,
            acquisition_end_utc: time_field(&row[self.acquisition_end_utc], row_idx)?,
            center_lat: float_field(&row[self.center_lat]),
            center_lon: float_field(&row[self.center_lon]),
            orbit_direction: text_field(&row[self.orbit_direction]),
            polarization: text_field(&row[self.polarization]),
            product_level: text_field(&row[self.product_level]),
            processing_time: time_field(&row[self.processing_time], row_idx)?,
            assets: text_field(&row[self.assets]),
        })
    }
}

fn text_field(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(v) => Some(v.clone()),
        _ => None,
    }
}

/// NaN is the stores' missing-value sentinel; it normalizes to `None`.
fn float_field(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Float(v) if v.is_nan() => None,
        Cell::Float(v) => Some(*v),
        Cell::Int(v) => Some(*v as f64),
        _ => None,
    }
}

fn time_field(cell: &Cell, row_idx: usize) -> MaterializeResult<Option<NaiveDateTime>> {
    match cell {
        Cell::Timestamp(v) => Ok(Some(*v)),
        Cell::Null => Ok(None),
        Cell::Text(v) => filter::parse_time(v).map(Some).map_err(|_| {
            MaterializeError::SchemaMismatch(format!(
                "row {} time column holds unparsable text '{}'",
                row_idx, v
            ))
        }),
        other => Err(MaterializeError::SchemaMismatch(format!(
            "row {} time column holds {:?}",
            row_idx, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::store::RowSet;

    fn square_hex() -> String {
        let geom = geometry::parse_wkt("POLYGON((0 0,1 0,1 1,0 1,0 0))").unwrap();
        hex::encode(geometry::encode_wkb(&geom).unwrap())
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn full_row(center_lat: Cell) -> Vec<Cell> {
        vec![
            Cell::Text("P1".into()),
            Cell::Text("varuna-1".into()),
            Cell::Text(square_hex()),
            Cell::Timestamp(ts("2023-05-01T00:00:00")),
            Cell::Timestamp(ts("2023-05-01T00:10:00")),
            center_lat,
            Cell::Float(0.5),
            Cell::Text("ASCENDING".into()),
            Cell::Text("VV".into()),
            Cell::Text("L1".into()),
            Cell::Timestamp(ts("2023-05-01T01:00:00")),
            Cell::Text("s3://catalog/p1.zip".into()),
        ]
    }

    fn full_rowset(rows: Vec<Vec<Cell>>) -> RowSet {
        let mut set = RowSet::new(
            crate::query::CANONICAL_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        set.rows = rows;
        set
    }

    #[test]
    fn test_materializes_full_row() {
        let cols = crate::query::ColumnMap::identity("items");
        let rows = full_rowset(vec![full_row(Cell::Float(0.5))]);
        let items = Materializer::new(&cols).materialize(&rows).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "P1");
        assert_eq!(items[0].center_lat, Some(0.5));
        assert!(matches!(items[0].geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_nan_normalizes_to_none() {
        let cols = crate::query::ColumnMap::identity("items");
        let rows = full_rowset(vec![full_row(Cell::Float(f64::NAN))]);
        let items = Materializer::new(&cols).materialize(&rows).unwrap();
        assert_eq!(items[0].center_lat, None);
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let cols = crate::query::ColumnMap::identity("items");
        let mut rows = full_rowset(vec![]);
        rows.columns.pop(); // drop "assets"
        let err = Materializer::new(&cols).materialize(&rows).unwrap_err();
        assert!(matches!(err, MaterializeError::SchemaMismatch(_)));
    }

    #[test]
    fn test_bad_geometry_is_fatal() {
        let cols = crate::query::ColumnMap::identity("items");
        let mut row = full_row(Cell::Float(0.5));
        row[2] = Cell::Text("deadbeef".into());
        let rows = full_rowset(vec![row]);
        let err = Materializer::new(&cols).materialize(&rows).unwrap_err();
        assert!(matches!(err, MaterializeError::Geometry(_)));
    }

    #[test]
    fn test_no_partial_mapping() {
        let cols = crate::query::ColumnMap::identity("items");
        let good = full_row(Cell::Float(0.5));
        let mut bad = full_row(Cell::Float(0.5));
        bad[0] = Cell::Null; // unusable identifier
        let rows = full_rowset(vec![good, bad]);
        let result = Materializer::new(&cols).materialize(&rows);
        assert!(result.is_err());
    }

    #[test]
    fn test_binary_geometry_accepted() {
        let cols = crate::query::ColumnMap::identity("items");
        let geom = geometry::parse_wkt("POINT(3 4)").unwrap();
        let mut row = full_row(Cell::Float(0.5));
        row[2] = Cell::Bytes(geometry::encode_wkb(&geom).unwrap());
        let rows = full_rowset(vec![row]);
        let items = Materializer::new(&cols).materialize(&rows).unwrap();
        assert!(matches!(items[0].geometry, Geometry::Point(_)));
    }

    #[test]
    fn test_row_order_preserved() {
        let cols = crate::query::ColumnMap::identity("items");
        let mut second = full_row(Cell::Float(0.5));
        second[0] = Cell::Text("P2".into());
        let rows = full_rowset(vec![full_row(Cell::Float(0.5)), second]);
        let items = Materializer::new(&cols).materialize(&rows).unwrap();
        assert_eq!(items[0].id, "P1");
        assert_eq!(items[1].id, "P2");
    }
}
