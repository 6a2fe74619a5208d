//! Axum-based RPC server.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use shamba_node::LandRegistry;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LandRegistry>,
    pub metrics_enabled: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Farmers
        .route("/farmers", post(handlers::onboard_farmer))
        .route("/farmers/:id", get(handlers::farmer))
        .route("/farmers/:id/account", get(handlers::ledger_account))
        .route("/farmers/:id/account/refresh", post(handlers::refresh_balance))
        .route("/farmers/:id/parcels", get(handlers::farmer_parcels))
        // Parcels
        .route("/parcels", post(handlers::register_parcel))
        .route("/parcels/:id", get(handlers::parcel))
        .route(
            "/parcels/:id/verifications",
            get(handlers::verification_requests).post(handlers::request_verification),
        )
        .route("/parcels/:id/tokenize", post(handlers::tokenize))
        .route("/parcels/:id/token", get(handlers::land_token))
        .route("/parcels/:id/projects", get(handlers::parcel_projects))
        // Carbon
        .route(
            "/carbon/projects",
            get(handlers::projects).post(handlers::create_project),
        )
        .route("/carbon/projects/:id", get(handlers::project))
        .route(
            "/carbon/projects/:id/transitions",
            post(handlers::transition_project),
        )
        .route(
            "/carbon/projects/:id/practice-verifications",
            get(handlers::practice_verifications),
        )
        .route(
            "/carbon/issuances",
            get(handlers::issuances).post(handlers::create_issuance),
        )
        .route(
            "/carbon/issuances/:id/transitions",
            post(handlers::transition_issuance),
        )
        .route(
            "/carbon/practice-verifications",
            post(handlers::record_practice_verification),
        )
        .route(
            "/carbon/practice-verifications/:id/evidence",
            get(handlers::evidence),
        )
        .route("/carbon/evidence", post(handlers::attach_evidence))
        .route(
            "/carbon/sensor-readings",
            get(handlers::sensor_readings).post(handlers::record_sensor_reading),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, registry: Arc<LandRegistry>, metrics_enabled: bool) -> Self {
        Self {
            port,
            state: AppState {
                registry,
                metrics_enabled,
            },
        }
    }

    /// Bind to the configured port on all interfaces and serve until
    /// `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(("0.0.0.0", self.port))
            .await
            .map_err(|e| RpcError::Server(format!("bind port {}: {e}", self.port)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(%addr, "RPC server listening");
        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}
