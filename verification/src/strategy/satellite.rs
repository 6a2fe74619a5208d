use std::sync::Arc;

use shamba_geometry::parse_polygon_json;
use shamba_imagery::{ImageryCredentials, ImageryProvider};
use shamba_types::{LandParcel, VerificationOutcome};
use tracing::warn;

/// Default analysis resolution in metres per pixel.
pub const DEFAULT_RESOLUTION_METERS: u32 = 10;

/// Submits the parcel polygon to an imagery provider for area analysis.
pub struct SatelliteStrategy {
    provider: Arc<dyn ImageryProvider>,
    credentials: ImageryCredentials,
    resolution_meters: u32,
}

impl SatelliteStrategy {
    pub fn new(
        provider: Arc<dyn ImageryProvider>,
        credentials: ImageryCredentials,
        resolution_meters: u32,
    ) -> Self {
        Self {
            provider,
            credentials,
            resolution_meters,
        }
    }

    pub async fn verify(&self, parcel: &LandParcel) -> VerificationOutcome {
        let polygon = match parse_polygon_json(&parcel.gps_coordinates) {
            Ok(polygon) => polygon,
            Err(e) => return VerificationOutcome::failed(e.to_string()),
        };

        let token = match self.provider.access_token(&self.credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(parcel_id = %parcel.id, error = %e, "imagery token exchange failed");
                return VerificationOutcome::failed(format!("Satellite verification failed: {e}"));
            }
        };

        let analysis = match self
            .provider
            .analyze_land(&polygon, self.resolution_meters, &token)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(parcel_id = %parcel.id, error = %e, "land analysis failed");
                return VerificationOutcome::failed(format!("Satellite verification failed: {e}"));
            }
        };

        if !analysis.is_success() {
            warn!(parcel_id = %parcel.id, http_status = analysis.http_status, "land analysis rejected");
            return VerificationOutcome::failed(format!(
                "Satellite verification failed: {}",
                analysis.http_status
            ));
        }

        VerificationOutcome {
            valid: true,
            calculated_area: analysis.area,
            match_percentage: analysis.match_percentage,
            ..Default::default()
        }
    }
}
