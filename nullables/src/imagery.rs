//! Nullable imagery provider: scripted analysis results.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use shamba_geometry::Polygon;
use shamba_imagery::{ImageryCredentials, ImageryError, ImageryProvider, LandAnalysis};

#[derive(Default)]
struct State {
    token_failure: Option<ImageryError>,
    analyses: VecDeque<Result<LandAnalysis, ImageryError>>,
    token_calls: usize,
    analysis_calls: usize,
    last_resolution: Option<u32>,
    last_polygon: Option<Vec<[f64; 2]>>,
}

/// Returns queued analysis results in order; once the queue is empty every
/// call answers HTTP 200 with a full match.
#[derive(Default)]
pub struct NullImagery {
    state: Mutex<State>,
}

impl NullImagery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_analysis(&self, result: Result<LandAnalysis, ImageryError>) {
        self.state.lock().unwrap().analyses.push_back(result);
    }

    /// Make every token exchange fail with `error`.
    pub fn fail_token(&self, error: ImageryError) {
        self.state.lock().unwrap().token_failure = Some(error);
    }

    pub fn token_calls(&self) -> usize {
        self.state.lock().unwrap().token_calls
    }

    pub fn analysis_calls(&self) -> usize {
        self.state.lock().unwrap().analysis_calls
    }

    pub fn last_resolution(&self) -> Option<u32> {
        self.state.lock().unwrap().last_resolution
    }

    pub fn last_polygon(&self) -> Option<Vec<[f64; 2]>> {
        self.state.lock().unwrap().last_polygon.clone()
    }
}

#[async_trait]
impl ImageryProvider for NullImagery {
    async fn access_token(&self, _credentials: &ImageryCredentials) -> Result<String, ImageryError> {
        let mut state = self.state.lock().unwrap();
        state.token_calls += 1;
        match &state.token_failure {
            Some(e) => Err(e.clone()),
            None => Ok(format!("null-token-{}", state.token_calls)),
        }
    }

    async fn analyze_land(
        &self,
        polygon: &Polygon,
        resolution_meters: u32,
        _token: &str,
    ) -> Result<LandAnalysis, ImageryError> {
        let mut state = self.state.lock().unwrap();
        state.analysis_calls += 1;
        state.last_resolution = Some(resolution_meters);
        state.last_polygon = Some(polygon.to_pairs());
        state.analyses.pop_front().unwrap_or(Ok(LandAnalysis {
            http_status: 200,
            area: None,
            match_percentage: Some(100.0),
        }))
    }
}
