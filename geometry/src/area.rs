//! Geodesic area on the WGS84 ellipsoid.
//!
//! Latitudes are mapped to authalic latitudes so the ellipsoid can be
//! replaced by an equal-area sphere, then the exact spherical excess of
//! each edge against the pole is summed. The result is independent of
//! winding order and vertex rotation, and agrees with ellipsoidal geodesic
//! tools to well under 0.1% at parcel scale.

use crate::{parse_polygon_json, GeometryError, Polygon};

/// WGS84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const SQ_METRES_PER_HECTARE: f64 = 10_000.0;

/// Projection-free area calculator for parcel boundaries.
#[derive(Clone, Copy, Debug)]
pub struct GeometryAreaCalculator {
    e: f64,
    e2: f64,
    qp: f64,
    authalic_radius: f64,
}

impl Default for GeometryAreaCalculator {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl GeometryAreaCalculator {
    pub fn wgs84() -> Self {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e = e2.sqrt();
        let qp = authalic_q(1.0, e, e2);
        Self {
            e,
            e2,
            qp,
            authalic_radius: WGS84_A * (qp / 2.0).sqrt(),
        }
    }

    /// Area of the stored `gps_coordinates` JSON in hectares.
    pub fn area_hectares(&self, gps_json: &str) -> Result<f64, GeometryError> {
        let polygon = parse_polygon_json(gps_json)?;
        Ok(self.polygon_area_hectares(&polygon))
    }

    pub fn polygon_area_hectares(&self, polygon: &Polygon) -> f64 {
        let vertices = polygon.vertices();
        let mut excess = 0.0;
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            let t1 = (self.authalic_latitude(a.latitude) / 2.0).tan();
            let t2 = (self.authalic_latitude(b.latitude) / 2.0).tan();
            let dl = normalize_lon_delta((b.longitude - a.longitude).to_radians());
            excess += 2.0 * ((dl / 2.0).tan() * (t1 + t2)).atan2(1.0 + t1 * t2);
        }
        excess.abs() * self.authalic_radius * self.authalic_radius / SQ_METRES_PER_HECTARE
    }

    fn authalic_latitude(&self, lat_deg: f64) -> f64 {
        let q = authalic_q(lat_deg.to_radians().sin(), self.e, self.e2);
        (q / self.qp).clamp(-1.0, 1.0).asin()
    }
}

fn authalic_q(sin_phi: f64, e: f64, e2: f64) -> f64 {
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Wrap a longitude difference into (-pi, pi].
fn normalize_lon_delta(mut dl: f64) -> f64 {
    use std::f64::consts::PI;
    while dl > PI {
        dl -= 2.0 * PI;
    }
    while dl <= -PI {
        dl += 2.0 * PI;
    }
    dl
}

/// Convenience wrapper using the WGS84 calculator.
pub fn geodesic_area_hectares(gps_json: &str) -> Result<f64, GeometryError> {
    GeometryAreaCalculator::wgs84().area_hectares(gps_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, rel: f64) -> bool {
        ((actual - expected) / expected).abs() <= rel
    }

    #[test]
    fn one_degree_square_at_equator() {
        let ha = geodesic_area_hectares("[[0,0],[0,1],[1,1],[1,0]]").unwrap();
        assert!(close(ha, 1_230_877.6, 1e-4), "got {ha}");
    }

    #[test]
    fn tenth_degree_square() {
        let ha = geodesic_area_hectares("[[0,0],[0,0.1],[0.1,0.1],[0.1,0]]").unwrap();
        assert!(close(ha, 12_309.07, 1e-4), "got {ha}");
    }

    #[test]
    fn hundredth_degree_square_near_nairobi() {
        let ha =
            geodesic_area_hectares("[[36.8,-1.3],[36.81,-1.3],[36.81,-1.29],[36.8,-1.29]]").unwrap();
        assert!(close(ha, 123.06, 1e-3), "got {ha}");
    }

    #[test]
    fn antimeridian_crossing_is_small() {
        let ha =
            geodesic_area_hectares("[[179.995,0],[-179.995,0],[-179.995,0.01],[179.995,0.01]]")
                .unwrap();
        assert!(close(ha, 123.09, 1e-3), "got {ha}");
    }

    #[test]
    fn invalid_geometry_propagates() {
        assert!(matches!(
            geodesic_area_hectares("[[0,0],[1,1]]"),
            Err(GeometryError::InvalidGeometry(_))
        ));
    }
}
