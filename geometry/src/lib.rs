//! Land polygon handling.
//!
//! Parcels carry their boundary as a JSON list of `[longitude, latitude]`
//! pairs. This crate validates that shape and computes the enclosed area in
//! hectares on the WGS84 ellipsoid.

pub mod area;
pub mod error;
pub mod polygon;

pub use area::{geodesic_area_hectares, GeometryAreaCalculator};
pub use error::GeometryError;
pub use polygon::{parse_polygon_json, Coordinate, Polygon};
