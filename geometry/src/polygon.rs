//! Polygon representation and JSON parsing.

use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// One boundary vertex in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.longitude, c.latitude]
    }
}

/// A simple polygon ring. A closing vertex equal to the first is dropped on
/// construction, so the ring is always implicitly closed.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    pub fn new(mut vertices: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(GeometryError::InvalidGeometry(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                vertices.len()
            )));
        }
        for (i, c) in vertices.iter().enumerate() {
            if !c.longitude.is_finite() || !c.latitude.is_finite() {
                return Err(GeometryError::InvalidGeometry(format!(
                    "vertex {i} is not a finite number"
                )));
            }
            if c.latitude.abs() > 90.0 {
                return Err(GeometryError::InvalidGeometry(format!(
                    "vertex {i} latitude {} is outside [-90, 90]",
                    c.latitude
                )));
            }
            if c.longitude.abs() > 180.0 {
                return Err(GeometryError::InvalidGeometry(format!(
                    "vertex {i} longitude {} is outside [-180, 180]",
                    c.longitude
                )));
            }
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Vertices as `[lon, lat]` pairs, the shape imagery providers expect.
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().map(|&c| c.into()).collect()
    }

    /// The ring closed explicitly, as GeoJSON requires.
    pub fn closed_ring(&self) -> Vec<[f64; 2]> {
        let mut ring = self.to_pairs();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        ring
    }
}

/// Parse a stored `gps_coordinates` string into a validated polygon.
pub fn parse_polygon_json(json: &str) -> Result<Polygon, GeometryError> {
    let vertices: Vec<Coordinate> = serde_json::from_str(json).map_err(|e| {
        GeometryError::InvalidGeometry(format!("expected a list of [lon, lat] pairs: {e}"))
    })?;
    Polygon::new(vertices)
}
