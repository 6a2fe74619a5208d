//! Imagery provider gateway.
//!
//! The satellite verification strategy exchanges client credentials for a
//! short-lived bearer token and submits a parcel polygon for land analysis.
//! [`ImageryProvider`] is the seam; [`SentinelHubClient`] talks HTTP.

pub mod client;
pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shamba_geometry::Polygon;

pub use client::{SentinelHubClient, SentinelHubConfig, DEFAULT_BASE_URL};
pub use error::ImageryError;

/// OAuth client credentials for the imagery provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Result of a land analysis call.
///
/// `http_status` is the provider's raw status. Non-success statuses are
/// returned here rather than as errors so callers can fold them into a
/// verification outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct LandAnalysis {
    pub http_status: u16,
    /// Area measured by the provider, in hectares.
    pub area: Option<f64>,
    /// How well the imagery matches the submitted boundary, 0-100.
    pub match_percentage: Option<f64>,
}

impl LandAnalysis {
    pub fn is_success(&self) -> bool {
        self.http_status == 200
    }
}

#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Exchange client credentials for a bearer token.
    async fn access_token(&self, credentials: &ImageryCredentials) -> Result<String, ImageryError>;

    /// Submit `polygon` for analysis at `resolution_meters` per pixel.
    async fn analyze_land(
        &self,
        polygon: &Polygon,
        resolution_meters: u32,
        token: &str,
    ) -> Result<LandAnalysis, ImageryError>;
}
