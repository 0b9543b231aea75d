//! Geometry codec error types.

use thiserror::Error;

/// Result type for geometry codec operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors produced while encoding or decoding footprint geometries
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    /// Text did not parse as well-known text
    #[error("invalid WKT: {0}")]
    WktParse(String),

    /// Byte payload did not decode as well-known binary
    #[error("invalid WKB: {0}")]
    WkbDecode(String),

    /// Hex prefix of a WKB payload was malformed
    #[error("invalid hex encoding: {0}")]
    HexDecode(String),

    /// WKB carried a geometry type this catalog does not store
    #[error("unsupported WKB geometry type code: {0}")]
    UnsupportedType(u32),
}
