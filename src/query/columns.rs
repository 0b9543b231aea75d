//! Logical-to-physical column mapping.
//!
//! Routes map the same logical fields onto different physical column names
//! depending on which store backs them, so query construction is
//! parameterized by a `ColumnMap` instead of hardcoding names.

/// Logical field names of a canonical catalog item, in canonical order.
///
/// Every store must be able to return all of these; the materializer treats
/// a missing one as a schema mismatch.
pub const CANONICAL_FIELDS: [&str; 12] = [
    "product_name",
    "satellite_name",
    "bounding_box_wkb",
    "acquisition_start_utc",
    "acquisition_end_utc",
    "center_lat",
    "center_lon",
    "orbit_direction",
    "polarization",
    "product_level",
    "processing_time",
    "assets",
];

/// One selected column: the logical field name and the physical column
/// that realizes it in a particular store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub logical: String,
    pub physical: String,
}

/// Per-store mapping from logical catalog fields to physical columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    /// Base relation (table name or registered file-backed view)
    pub relation: String,
    /// Unique item identifier column
    pub id: String,
    /// Collection / platform equality column
    pub category: String,
    /// Footprint geometry column (WKB, hex or binary)
    pub geometry: String,
    /// Acquisition window start column
    pub start: String,
    /// Acquisition window stop column
    pub stop: String,
    /// Full select list in canonical order
    pub select: Vec<SelectColumn>,
}

impl ColumnMap {
    /// Identity mapping over the canonical field names for a given relation.
    pub fn identity(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            id: "product_name".into(),
            category: "satellite_name".into(),
            geometry: "bounding_box_wkb".into(),
            start: "acquisition_start_utc".into(),
            stop: "acquisition_end_utc".into(),
            select: CANONICAL_FIELDS
                .iter()
                .map(|f| SelectColumn {
                    logical: (*f).to_string(),
                    physical: (*f).to_string(),
                })
                .collect(),
        }
    }

    /// Mapping for the relational store's generated schema.
    pub fn relational_default() -> Self {
        Self::identity("piersight_stac.stac")
    }

    /// Mapping for the columnar file store registered under a view name.
    pub fn analytical_default() -> Self {
        Self::identity("stac_items")
    }

    /// Physical name for a logical field, if the map carries it.
    pub fn physical(&self, logical: &str) -> Option<&str> {
        self.select
            .iter()
            .find(|c| c.logical == logical)
            .map(|c| c.physical.as_str())
    }
}
