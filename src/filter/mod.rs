//! Filter parameter validation.
//!
//! Turns untrusted raw request parameters into a validated `FilterSet`
//! before any query is constructed. Validation is a pure function of its
//! input: format and membership checks only, no store access. Range
//! comparison of the two time bounds belongs to the query builder, keeping
//! format failures and range failures as distinct rejection kinds.

mod errors;

pub use errors::{FilterError, FilterResult};

use chrono::NaiveDateTime;
use geo_types::{Coord, Geometry, Rect};

use crate::geometry;

/// Default page size when the client does not ask for one
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw request parameters as they arrive from the HTTP layer.
///
/// Field names follow the public query-string parameters; all of them are
/// optional at this stage.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    /// Spatial filter in WKT form
    pub coordinates: Option<String>,
    /// Spatial filter as comma-separated bounding box
    pub bbox: Option<String>,
    /// Acquisition window start, ISO-8601
    pub start_time: Option<String>,
    /// Acquisition window stop, ISO-8601
    pub stop_time: Option<String>,
    /// Collection / platform identifier
    pub collection: Option<String>,
    /// Absolute cap on items across all pages
    pub num: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
    /// Skip count
    pub offset: Option<u64>,
}

/// A validated bounding box (4 or 6 components; altitude bounds unused by
/// the query core but preserved for round-tripping)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub min_alt: Option<f64>,
    pub max_alt: Option<f64>,
}

impl BoundingBox {
    /// The box as a rectangular polygon, for stores whose spatial predicate
    /// takes a geometry rather than an envelope.
    pub fn to_polygon(&self) -> Geometry<f64> {
        let rect = Rect::new(
            Coord {
                x: self.min_lon,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lon,
                y: self.max_lat,
            },
        );
        Geometry::Polygon(rect.to_polygon())
    }
}

/// Validated spatial filter: either well-known text (kept as text, already
/// format-checked) or a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialFilter {
    Wkt(String),
    Bbox(BoundingBox),
}

/// Validated acquisition time window. Both bounds always present; the
/// start ≤ stop comparison happens in the query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

/// The validated input to query construction
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub spatial: Option<SpatialFilter>,
    pub window: Option<TimeWindow>,
    pub collection: Option<String>,
    pub limit: u32,
    pub offset: u64,
    pub num: Option<u32>,
}

impl FilterSet {
    /// A bare filter set with just paging values, for tests and lookups
    pub fn paged(limit: u32, offset: u64) -> Self {
        Self {
            spatial: None,
            window: None,
            collection: None,
            limit,
            offset,
            num: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_window(mut self, start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        self.window = Some(TimeWindow { start, stop });
        self
    }

    pub fn with_spatial(mut self, spatial: SpatialFilter) -> Self {
        self.spatial = Some(spatial);
        self
    }

    pub fn with_num(mut self, num: u32) -> Self {
        self.num = Some(num);
        self
    }
}

/// Validates raw parameters against a collection allow-list and a
/// store-specific limit bound.
pub struct FilterValidator<'a> {
    collections: &'a [String],
    max_limit: u32,
}

impl<'a> FilterValidator<'a> {
    pub fn new(collections: &'a [String], max_limit: u32) -> Self {
        Self {
            collections,
            max_limit,
        }
    }

    /// Validates every parameter, producing a `FilterSet` or the first
    /// rejection encountered. Order: category, spatial, temporal, paging.
    pub fn validate(&self, raw: &RawParams) -> FilterResult<FilterSet> {
        let collection = match &raw.collection {
            Some(id) => {
                if !self.collections.iter().any(|c| c == id) {
                    return Err(FilterError::InvalidCategory(id.clone()));
                }
                Some(id.clone())
            }
            None => None,
        };

        let spatial = self.validate_spatial(raw)?;
        let window = self.validate_window(raw)?;

        let limit = raw.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > self.max_limit {
            return Err(FilterError::LimitOutOfRange {
                given: limit,
                max: self.max_limit,
            });
        }

        if raw.num == Some(0) {
            return Err(FilterError::InvalidNum);
        }

        Ok(FilterSet {
            spatial,
            window,
            collection,
            limit,
            offset: raw.offset.unwrap_or(0),
            num: raw.num,
        })
    }

    fn validate_spatial(&self, raw: &RawParams) -> FilterResult<Option<SpatialFilter>> {
        match (&raw.coordinates, &raw.bbox) {
            (Some(_), Some(_)) => Err(FilterError::InvalidGeometry(
                "supply either coordinates or bbox, not both".into(),
            )),
            (Some(text), None) => {
                geometry::parse_wkt(text)
                    .map_err(|e| FilterError::InvalidGeometry(e.to_string()))?;
                Ok(Some(SpatialFilter::Wkt(text.clone())))
            }
            (None, Some(text)) => Ok(Some(SpatialFilter::Bbox(parse_bbox(text)?))),
            (None, None) => Ok(None),
        }
    }

    fn validate_window(&self, raw: &RawParams) -> FilterResult<Option<TimeWindow>> {
        match (&raw.start_time, &raw.stop_time) {
            (Some(start), Some(stop)) => Ok(Some(TimeWindow {
                start: parse_time(start)?,
                stop: parse_time(stop)?,
            })),
            (None, None) => Ok(None),
            _ => Err(FilterError::IncompleteTimeWindow),
        }
    }
}

/// Parses an ISO-8601 time string, stripping a trailing `Z` first.
pub fn parse_time(text: &str) -> FilterResult<NaiveDateTime> {
    let trimmed = text.strip_suffix('Z').unwrap_or(text);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| FilterError::InvalidTimeFormat(text.to_string()))
}

/// Parses a comma-separated bounding box with exactly 4 or 6 components.
fn parse_bbox(text: &str) -> FilterResult<BoundingBox> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 && parts.len() != 6 {
        return Err(FilterError::InvalidBbox(format!(
            "expected 4 or 6 components, got {}",
            parts.len()
        )));
    }

    let mut values = Vec::with_capacity(parts.len());
    for part in &parts {
        let v: f64 = part
            .parse()
            .map_err(|_| FilterError::InvalidBbox(format!("non-numeric component '{}'", part)))?;
        if !v.is_finite() {
            return Err(FilterError::InvalidBbox(format!(
                "non-finite component '{}'",
                part
            )));
        }
        values.push(v);
    }

    // 4-element: lon/lat pairs; 6-element: lon/lat/alt triples
    let (min_lon, min_lat, max_lon, max_lat, min_alt, max_alt) = if values.len() == 4 {
        (values[0], values[1], values[2], values[3], None, None)
    } else {
        (
            values[0],
            values[1],
            values[3],
            values[4],
            Some(values[2]),
            Some(values[5]),
        )
    };

    if min_lon > max_lon {
        return Err(FilterError::InvalidBbox(format!(
            "min_lon {} exceeds max_lon {}",
            min_lon, max_lon
        )));
    }
    if min_lat > max_lat {
        return Err(FilterError::InvalidBbox(format!(
            "min_lat {} exceeds max_lat {}",
            min_lat, max_lat
        )));
    }

    Ok(BoundingBox {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
        min_alt,
        max_alt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collections() -> Vec<String> {
        vec!["varuna-1".into(), "varuna-2".into(), "matsya-1".into()]
    }

    fn validator(collections: &[String]) -> FilterValidator<'_> {
        FilterValidator::new(collections, 50)
    }

    #[test]
    fn test_empty_params_get_defaults() {
        let cols = collections();
        let set = validator(&cols).validate(&RawParams::default()).unwrap();
        assert_eq!(set.limit, DEFAULT_LIMIT);
        assert_eq!(set.offset, 0);
        assert!(set.spatial.is_none());
        assert!(set.window.is_none());
        assert!(set.collection.is_none());
    }

    #[test]
    fn test_valid_bbox() {
        let cols = collections();
        let raw = RawParams {
            bbox: Some("0,0,1,1".into()),
            ..Default::default()
        };
        let set = validator(&cols).validate(&raw).unwrap();
        match set.spatial {
            Some(SpatialFilter::Bbox(b)) => {
                assert_eq!(b.min_lon, 0.0);
                assert_eq!(b.max_lat, 1.0);
                assert!(b.min_alt.is_none());
            }
            other => panic!("expected bbox, got {:?}", other),
        }
    }

    #[test]
    fn test_six_element_bbox() {
        let cols = collections();
        let raw = RawParams {
            bbox: Some("0,0,-10,1,1,10".into()),
            ..Default::default()
        };
        let set = validator(&cols).validate(&raw).unwrap();
        match set.spatial {
            Some(SpatialFilter::Bbox(b)) => {
                assert_eq!(b.min_alt, Some(-10.0));
                assert_eq!(b.max_alt, Some(10.0));
            }
            other => panic!("expected bbox, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_bbox_rejected() {
        let cols = collections();
        let raw = RawParams {
            bbox: Some("2,0,1,1".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBbox(_)));
    }

    #[test]
    fn test_wrong_component_count_rejected() {
        let cols = collections();
        for bbox in ["0,0,1", "0,0,1,1,2", "0,0,1,1,2,3,4"] {
            let raw = RawParams {
                bbox: Some(bbox.into()),
                ..Default::default()
            };
            let err = validator(&cols).validate(&raw).unwrap_err();
            assert!(matches!(err, FilterError::InvalidBbox(_)), "bbox {}", bbox);
        }
    }

    #[test]
    fn test_non_numeric_bbox_rejected() {
        let cols = collections();
        let raw = RawParams {
            bbox: Some("0,zero,1,1".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBbox(_)));
    }

    #[test]
    fn test_valid_wkt() {
        let cols = collections();
        let raw = RawParams {
            coordinates: Some("POLYGON((0 0,1 0,1 1,0 1,0 0))".into()),
            ..Default::default()
        };
        let set = validator(&cols).validate(&raw).unwrap();
        assert!(matches!(set.spatial, Some(SpatialFilter::Wkt(_))));
    }

    #[test]
    fn test_invalid_wkt_rejected() {
        let cols = collections();
        let raw = RawParams {
            coordinates: Some("POLYGON((broken".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGeometry(_)));
    }

    #[test]
    fn test_both_spatial_forms_rejected() {
        let cols = collections();
        let raw = RawParams {
            coordinates: Some("POINT(0 0)".into()),
            bbox: Some("0,0,1,1".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGeometry(_)));
    }

    #[test]
    fn test_time_parsing_strips_z() {
        assert!(parse_time("2023-05-01T00:00:00Z").is_ok());
        assert!(parse_time("2023-05-01T00:00:00").is_ok());
        assert!(parse_time("2023-05-01T00:00:00.250Z").is_ok());
    }

    #[test]
    fn test_bad_time_format_rejected() {
        let cols = collections();
        let raw = RawParams {
            start_time: Some("yesterday".into()),
            stop_time: Some("2023-05-01T00:00:00Z".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert!(matches!(err, FilterError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_lone_time_bound_rejected() {
        let cols = collections();
        let raw = RawParams {
            start_time: Some("2023-05-01T00:00:00Z".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert_eq!(err, FilterError::IncompleteTimeWindow);
    }

    #[test]
    fn test_unknown_collection_rejected() {
        let cols = collections();
        let raw = RawParams {
            collection: Some("landsat-9".into()),
            ..Default::default()
        };
        let err = validator(&cols).validate(&raw).unwrap_err();
        assert_eq!(err, FilterError::InvalidCategory("landsat-9".into()));
    }

    #[test]
    fn test_known_collection_accepted() {
        let cols = collections();
        let raw = RawParams {
            collection: Some("varuna-1".into()),
            ..Default::default()
        };
        let set = validator(&cols).validate(&raw).unwrap();
        assert_eq!(set.collection.as_deref(), Some("varuna-1"));
    }

    #[test]
    fn test_limit_bounds_enforced() {
        let cols = collections();
        for limit in [0u32, 51, 1000] {
            let raw = RawParams {
                limit: Some(limit),
                ..Default::default()
            };
            let err = validator(&cols).validate(&raw).unwrap_err();
            assert!(
                matches!(err, FilterError::LimitOutOfRange { .. }),
                "limit {}",
                limit
            );
        }
    }

    #[test]
    fn test_zero_num_rejected() {
        let cols = collections();
        let raw = RawParams {
            num: Some(0),
            ..Default::default()
        };
        assert_eq!(
            validator(&cols).validate(&raw).unwrap_err(),
            FilterError::InvalidNum
        );
    }

    #[test]
    fn test_validation_is_pure() {
        let cols = collections();
        let raw = RawParams {
            bbox: Some("0,0,1,1".into()),
            collection: Some("varuna-1".into()),
            limit: Some(5),
            ..Default::default()
        };
        let v = validator(&cols);
        let a = v.validate(&raw).unwrap();
        let b = v.validate(&raw).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bbox_to_polygon() {
        let b = BoundingBox {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 2.0,
            max_lat: 1.0,
            min_alt: None,
            max_alt: None,
        };
        match b.to_polygon() {
            Geometry::Polygon(p) => assert_eq!(p.exterior().0.len(), 5),
            other => panic!("expected polygon, got {:?}", other),
        }
    }
}
