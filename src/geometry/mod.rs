//! Geometry codec for footprint geometries.
//!
//! Stores keep item footprints as well-known binary (hex-encoded in the
//! relational store, raw bytes elsewhere); clients supply filters as
//! well-known text or bounding boxes; responses carry GeoJSON coordinate
//! structures. This module is the single seam for all three encodings.
//!
//! Supported WKB types: Point, LineString, Polygon, MultiPolygon (XY only).
//! Both byte orders are accepted on decode; encode always emits
//! little-endian. An EWKB SRID prefix is tolerated and skipped.

mod errors;

pub use errors::{GeometryError, GeometryResult};

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use wkt::ToWkt;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOLYGON: u32 = 6;

/// EWKB flag bit marking an embedded SRID
const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Parses well-known text into a geometry value.
pub fn parse_wkt(text: &str) -> GeometryResult<Geometry<f64>> {
    use std::str::FromStr;
    wkt::Wkt::from_str(text)
        .map_err(|e| GeometryError::WktParse(format!("{:?}", e)))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| GeometryError::WktParse(format!("{:?}", e)))
        })
}

/// Serializes a geometry back to canonical well-known text.
pub fn wkt_string(geom: &Geometry<f64>) -> String {
    geom.wkt_string()
}

/// Returns the GeoJSON type name of a geometry ("Polygon", "Point", ...).
pub fn geometry_kind(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "LineString",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Polygon",
        Geometry::Triangle(_) => "Polygon",
    }
}

/// Encodes a geometry as a GeoJSON geometry value.
pub fn geojson_value(geom: &Geometry<f64>) -> geojson::Value {
    geojson::Value::from(geom)
}

/// Decodes a hex-encoded WKB payload.
pub fn decode_wkb_hex(text: &str) -> GeometryResult<Geometry<f64>> {
    let bytes = hex::decode(text.trim()).map_err(|e| GeometryError::HexDecode(e.to_string()))?;
    decode_wkb(&bytes)
}

/// Decodes a binary WKB payload.
pub fn decode_wkb(bytes: &[u8]) -> GeometryResult<Geometry<f64>> {
    let mut reader = WkbReader::new(bytes);
    let geom = reader.read_geometry()?;
    Ok(geom)
}

/// Encodes a geometry as little-endian WKB.
///
/// Only the types this catalog stores are supported; everything else is an
/// `UnsupportedType` failure.
pub fn encode_wkb(geom: &Geometry<f64>) -> GeometryResult<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    write_geometry(&mut out, geom)?;
    Ok(out)
}

// ==================
// WKB reader
// ==================

struct WkbReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WkbReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> GeometryResult<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(GeometryError::WkbDecode(format!(
                "truncated payload at byte {}",
                self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self, little: bool) -> GeometryResult<u32> {
        let raw: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(if little {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn read_f64(&mut self, little: bool) -> GeometryResult<f64> {
        let raw: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(if little {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }

    fn read_coord(&mut self, little: bool) -> GeometryResult<Coord<f64>> {
        let x = self.read_f64(little)?;
        let y = self.read_f64(little)?;
        Ok(Coord { x, y })
    }

    fn read_ring(&mut self, little: bool) -> GeometryResult<LineString<f64>> {
        let count = self.read_u32(little)? as usize;
        let mut coords = Vec::with_capacity(count);
        for _ in 0..count {
            coords.push(self.read_coord(little)?);
        }
        Ok(LineString::from(coords))
    }

    /// Reads one geometry header (byte order + type) and its body.
    fn read_geometry(&mut self) -> GeometryResult<Geometry<f64>> {
        let order = self.take(1)?[0];
        let little = match order {
            0 => false,
            1 => true,
            other => {
                return Err(GeometryError::WkbDecode(format!(
                    "invalid byte-order marker {}",
                    other
                )))
            }
        };

        let raw_type = self.read_u32(little)?;
        if raw_type & EWKB_SRID_FLAG != 0 {
            // Skip the embedded SRID
            self.read_u32(little)?;
        }
        let type_code = raw_type & 0xFF;

        match type_code {
            WKB_POINT => {
                let c = self.read_coord(little)?;
                Ok(Geometry::Point(Point::from(c)))
            }
            WKB_LINESTRING => Ok(Geometry::LineString(self.read_ring(little)?)),
            WKB_POLYGON => Ok(Geometry::Polygon(self.read_polygon(little)?)),
            WKB_MULTIPOLYGON => {
                let count = self.read_u32(little)? as usize;
                let mut polys = Vec::with_capacity(count);
                for _ in 0..count {
                    // Each member repeats the full byte-order + type header
                    let member = self.read_geometry()?;
                    match member {
                        Geometry::Polygon(p) => polys.push(p),
                        _ => {
                            return Err(GeometryError::WkbDecode(
                                "MultiPolygon member is not a Polygon".into(),
                            ))
                        }
                    }
                }
                Ok(Geometry::MultiPolygon(MultiPolygon(polys)))
            }
            other => Err(GeometryError::UnsupportedType(other)),
        }
    }

    fn read_polygon(&mut self, little: bool) -> GeometryResult<Polygon<f64>> {
        let rings = self.read_u32(little)? as usize;
        if rings == 0 {
            return Err(GeometryError::WkbDecode("polygon with zero rings".into()));
        }
        let exterior = self.read_ring(little)?;
        let mut interiors = Vec::with_capacity(rings - 1);
        for _ in 1..rings {
            interiors.push(self.read_ring(little)?);
        }
        Ok(Polygon::new(exterior, interiors))
    }
}

// ==================
// WKB writer
// ==================

fn write_header(out: &mut Vec<u8>, type_code: u32) {
    out.push(1); // little-endian
    out.extend_from_slice(&type_code.to_le_bytes());
}

fn write_coord(out: &mut Vec<u8>, c: &Coord<f64>) {
    out.extend_from_slice(&c.x.to_le_bytes());
    out.extend_from_slice(&c.y.to_le_bytes());
}

fn write_ring(out: &mut Vec<u8>, ring: &LineString<f64>) {
    out.extend_from_slice(&(ring.0.len() as u32).to_le_bytes());
    for c in &ring.0 {
        write_coord(out, c);
    }
}

fn write_polygon_body(out: &mut Vec<u8>, poly: &Polygon<f64>) {
    out.extend_from_slice(&((1 + poly.interiors().len()) as u32).to_le_bytes());
    write_ring(out, poly.exterior());
    for ring in poly.interiors() {
        write_ring(out, ring);
    }
}

fn write_geometry(out: &mut Vec<u8>, geom: &Geometry<f64>) -> GeometryResult<()> {
    match geom {
        Geometry::Point(p) => {
            write_header(out, WKB_POINT);
            write_coord(out, &p.0);
        }
        Geometry::LineString(ls) => {
            write_header(out, WKB_LINESTRING);
            write_ring(out, ls);
        }
        Geometry::Polygon(poly) => {
            write_header(out, WKB_POLYGON);
            write_polygon_body(out, poly);
        }
        Geometry::MultiPolygon(mp) => {
            write_header(out, WKB_MULTIPOLYGON);
            out.extend_from_slice(&(mp.0.len() as u32).to_le_bytes());
            for poly in &mp.0 {
                write_header(out, WKB_POLYGON);
                write_polygon_body(out, poly);
            }
        }
        other => {
            return Err(GeometryError::UnsupportedType(wkb_type_code(other)));
        }
    }
    Ok(())
}

fn wkb_type_code(geom: &Geometry<f64>) -> u32 {
    match geom {
        Geometry::Point(_) => WKB_POINT,
        Geometry::LineString(_) => WKB_LINESTRING,
        Geometry::Polygon(_) => WKB_POLYGON,
        Geometry::MultiPolygon(_) => WKB_MULTIPOLYGON,
        _ => 0,
    }
}
