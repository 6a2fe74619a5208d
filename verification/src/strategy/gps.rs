use shamba_geometry::GeometryAreaCalculator;
use shamba_types::{LandParcel, VerificationOutcome};
use tracing::warn;

/// Cross-checks the parcel's own polygon against its declared area.
#[derive(Clone, Copy, Debug)]
pub struct GpsStrategy {
    calculator: GeometryAreaCalculator,
    tolerance: f64,
}

impl GpsStrategy {
    /// `tolerance` is a fraction of the declared area, e.g. `0.10`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            calculator: GeometryAreaCalculator::wgs84(),
            tolerance,
        }
    }

    pub fn verify(&self, parcel: &LandParcel) -> VerificationOutcome {
        if parcel.total_area.is_zero() {
            return VerificationOutcome::failed("Declared area must be positive");
        }
        match self.calculator.area_hectares(&parcel.gps_coordinates) {
            Ok(calculated) => self.assess(parcel.total_area.as_f64(), calculated),
            Err(e) => {
                warn!(parcel_id = %parcel.id, error = %e, "gps verification could not compute area");
                VerificationOutcome::failed(e.to_string())
            }
        }
    }

    /// Compare a computed area with the declared one.
    pub fn assess(&self, declared: f64, calculated: f64) -> VerificationOutcome {
        if !declared.is_finite() || declared <= 0.0 || !calculated.is_finite() {
            return VerificationOutcome::failed("Declared and calculated areas must be positive numbers");
        }
        VerificationOutcome {
            valid: (calculated - declared).abs() <= declared * self.tolerance,
            calculated_area: Some(calculated),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_types::{FarmerId, Hectares, ParcelId, Timestamp, VerificationStatus};

    fn parcel(area: Hectares, gps: &str) -> LandParcel {
        LandParcel {
            id: ParcelId::new(1),
            farmer: FarmerId::new(1),
            title_deed_number: None,
            total_area: area,
            gps_coordinates: gps.into(),
            address: String::new(),
            country: "Kenya".into(),
            region: "Nakuru".into(),
            verification_status: VerificationStatus::Unverified,
            verification_method: None,
            verified_by: None,
            verification_date: None,
            document_hash: None,
            created_at: Timestamp::EPOCH,
            updated_at: Timestamp::EPOCH,
        }
    }

    #[test]
    fn tolerance_band() {
        let gps = GpsStrategy::new(0.10);
        let ok = gps.assess(10.0, 10.9);
        assert!(ok.valid && !ok.has_error());
        assert_eq!(ok.calculated_area, Some(10.9));

        let out = gps.assess(10.0, 11.5);
        assert!(!out.valid && !out.has_error());
        assert!(gps.assess(10.0, 9.1).valid);
        assert!(!gps.assess(10.0, 8.9).valid);
    }

    #[test]
    fn polygon_within_tolerance() {
        // ~123.06 ha
        let p = parcel(
            Hectares::from_centi(12_000),
            "[[36.8,-1.3],[36.81,-1.3],[36.81,-1.29],[36.8,-1.29]]",
        );
        let out = GpsStrategy::new(0.10).verify(&p);
        assert!(out.is_accepted(), "{out:?}");
        let area = out.calculated_area.unwrap();
        assert!((area - 123.06).abs() < 0.1);
    }

    #[test]
    fn malformed_polygon_is_an_error_not_a_rejection() {
        let p = parcel(Hectares::from_centi(1_000), "[[0,0],[1,1]]");
        let out = GpsStrategy::new(0.10).verify(&p);
        assert!(!out.valid);
        assert!(out.has_error());
    }

    #[test]
    fn zero_declared_area_is_an_error() {
        let p = parcel(Hectares::ZERO, "[[0,0],[0,1],[1,1]]");
        assert!(GpsStrategy::new(0.10).verify(&p).has_error());
    }
}
