//! HTTP client for a Sentinel Hub style imagery API.
//!
//! - `POST {base}/oauth/token` with a form-encoded client-credentials grant
//!   returns `{"access_token": ...}`.
//! - `POST {base}/api/v1/analysis/land` with a bearer token and
//!   `{"geometry": {"type": "Polygon", "coordinates": [ring]}, "resolution": n}`
//!   returns `{"area": ..., "match": ...}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shamba_geometry::Polygon;
use tracing::{debug, warn};

use crate::{ImageryCredentials, ImageryError, ImageryProvider, LandAnalysis};

/// Default timeout for provider requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_BASE_URL: &str = "https://services.sentinel-hub.com";

#[derive(Clone, Debug)]
pub struct SentinelHubConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for SentinelHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct SentinelHubClient {
    base_url: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    area: Option<f64>,
    #[serde(default, rename = "match")]
    match_percentage: Option<f64>,
}

fn transport_error(e: reqwest::Error) -> ImageryError {
    if e.is_timeout() {
        ImageryError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        ImageryError::Transport(format!("connection failed: {e}"))
    } else {
        ImageryError::Transport(e.to_string())
    }
}

impl SentinelHubClient {
    pub fn new(config: SentinelHubConfig) -> Result<Self, ImageryError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ImageryError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl ImageryProvider for SentinelHubClient {
    async fn access_token(&self, credentials: &ImageryCredentials) -> Result<String, ImageryError> {
        let url = format!("{}/oauth/token", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "imagery token exchange rejected");
            return Err(ImageryError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ImageryError::Decode(format!("failed to parse token response: {e}")))?;
        Ok(body.access_token)
    }

    async fn analyze_land(
        &self,
        polygon: &Polygon,
        resolution_meters: u32,
        token: &str,
    ) -> Result<LandAnalysis, ImageryError> {
        let url = format!("{}/api/v1/analysis/land", self.base_url);
        let payload = json!({
            "geometry": {
                "type": "Polygon",
                "coordinates": [polygon.closed_ring()],
            },
            "resolution": resolution_meters,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let http_status = response.status().as_u16();
        debug!(http_status, "land analysis response");
        if http_status != 200 {
            return Ok(LandAnalysis {
                http_status,
                area: None,
                match_percentage: None,
            });
        }

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| ImageryError::Decode(format!("failed to parse analysis response: {e}")))?;
        Ok(LandAnalysis {
            http_status,
            area: body.area,
            match_percentage: body.match_percentage,
        })
    }
}
