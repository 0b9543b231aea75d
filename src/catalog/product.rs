//! Public record mapping.
//!
//! Pure mapping from a canonical item into the public output schema. The
//! footprint geometry is re-encoded as a GeoJSON coordinate structure; the
//! scalar fields pass through with absent values serialized as null.

use serde::Serialize;
use serde_json::Value;

use crate::geometry;
use crate::materialize::{CanonicalItem, MaterializeError, MaterializeResult};

/// GeoJSON-shaped footprint carried on every product.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryJson {
    pub coordinates: Value,
}

/// One catalog item in the public output schema.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub geom_type: String,
    pub bounding_box_wkb: GeometryJson,
    pub product_name: String,
    pub satellite_name: Option<String>,
    pub acquisition_start_utc: Option<chrono::NaiveDateTime>,
    pub acquisition_end_utc: Option<chrono::NaiveDateTime>,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub orbit_direction: Option<String>,
    pub polarization: Option<String>,
    pub product_level: Option<String>,
    pub processing_time: Option<chrono::NaiveDateTime>,
    pub assets: Option<String>,
}

/// Maps one canonical item into the public schema.
pub fn map_product(item: &CanonicalItem) -> MaterializeResult<Product> {
    if item.id.is_empty() {
        return Err(MaterializeError::SchemaMismatch(
            "product without identifier".into(),
        ));
    }

    Ok(Product {
        id: item.id.clone(),
        kind: "Feature".to_string(),
        geom_type: geometry::geometry_kind(&item.geometry).to_string(),
        bounding_box_wkb: GeometryJson {
            coordinates: coordinates_json(&item.geometry),
        },
        product_name: item.id.clone(),
        satellite_name: item.satellite_name.clone(),
        acquisition_start_utc: item.acquisition_start_utc,
        acquisition_end_utc: item.acquisition_end_utc,
        center_lat: item.center_lat,
        center_lon: item.center_lon,
        orbit_direction: item.orbit_direction.clone(),
        polarization: item.polarization.clone(),
        product_level: item.product_level.clone(),
        processing_time: item.processing_time,
        assets: item.assets.clone(),
    })
}

/// The bare coordinate array of a geometry's GeoJSON form.
fn coordinates_json(geom: &geo_types::Geometry<f64>) -> Value {
    let encoded = geojson::Geometry::new(geometry::geojson_value(geom));
    match serde_json::to_value(&encoded) {
        Ok(Value::Object(mut obj)) => obj.remove("coordinates").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_wkt;

    fn item(id: &str) -> CanonicalItem {
        CanonicalItem {
            id: id.to_string(),
            geometry: parse_wkt("POLYGON((0 0,1 0,1 1,0 1,0 0))").unwrap(),
            satellite_name: Some("varuna-1".into()),
            acquisition_start_utc: None,
            acquisition_end_utc: None,
            center_lat: Some(0.5),
            center_lon: None,
            orbit_direction: None,
            polarization: None,
            product_level: None,
            processing_time: None,
            assets: None,
        }
    }

    #[test]
    fn test_maps_polygon_coordinates() {
        let product = map_product(&item("P1")).unwrap();
        assert_eq!(product.geom_type, "Polygon");
        let rings = product.bounding_box_wkb.coordinates.as_array().unwrap();
        assert_eq!(rings.len(), 1);
        let exterior = rings[0].as_array().unwrap();
        assert_eq!(exterior.len(), 5);
        assert_eq!(exterior[0].as_array().unwrap()[0], 0.0);
    }

    #[test]
    fn test_feature_envelope_fields() {
        let product = map_product(&item("P1")).unwrap();
        assert_eq!(product.kind, "Feature");
        assert_eq!(product.id, "P1");
        assert_eq!(product.product_name, "P1");
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "Feature");
        assert!(json["center_lon"].is_null());
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let result = map_product(&item(""));
        assert!(matches!(
            result,
            Err(MaterializeError::SchemaMismatch(_))
        ));
    }
}
