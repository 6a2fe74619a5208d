//! RPC error types and their HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shamba_carbon::CarbonError;
use shamba_node::NodeError;
use shamba_store::StoreError;
use shamba_tokenization::TokenizationError;
use shamba_types::ShambaError;
use shamba_verification::VerificationError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing or malformed identity: {0}")]
    Unauthenticated(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("server error: {0}")]
    Server(String),
}

impl From<ShambaError> for RpcError {
    fn from(e: ShambaError) -> Self {
        RpcError::Node(e.into())
    }
}

impl From<CarbonError> for RpcError {
    fn from(e: CarbonError) -> Self {
        RpcError::Node(e.into())
    }
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) | RpcError::MetricsDisabled => StatusCode::NOT_FOUND,
            RpcError::Node(e) => node_status(e),
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn node_status(e: &NodeError) -> StatusCode {
    match e {
        NodeError::NotFound(_) => StatusCode::NOT_FOUND,
        NodeError::NotAuthorized(_) => StatusCode::FORBIDDEN,
        NodeError::AlreadyExists(_) => StatusCode::CONFLICT,
        NodeError::Invalid(_) | NodeError::Geometry(_) => StatusCode::UNPROCESSABLE_ENTITY,
        NodeError::Ledger(_) => StatusCode::BAD_GATEWAY,
        NodeError::Store(e) => store_status(e),
        NodeError::Verification(e) => match e {
            VerificationError::UnsupportedMethod(_) => StatusCode::UNPROCESSABLE_ENTITY,
            VerificationError::ParcelNotFound(_) => StatusCode::NOT_FOUND,
            VerificationError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            VerificationError::AlreadyVerified(_) => StatusCode::CONFLICT,
            VerificationError::Store(e) => store_status(e),
        },
        NodeError::Tokenization(e) => match e {
            TokenizationError::ParcelNotFound(_) => StatusCode::NOT_FOUND,
            TokenizationError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            TokenizationError::NotVerified { .. } | TokenizationError::AlreadyTokenized(_) => {
                StatusCode::CONFLICT
            }
            TokenizationError::Ledger(_) => StatusCode::BAD_GATEWAY,
            TokenizationError::Store(e) => store_status(e),
            TokenizationError::Metadata(_) | TokenizationError::Unrecorded { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        NodeError::Carbon(e) => match e {
            CarbonError::ProjectNotFound(_)
            | CarbonError::IssuanceNotFound(_)
            | CarbonError::PracticeVerificationNotFound(_)
            | CarbonError::ParcelNotFound(_) => StatusCode::NOT_FOUND,
            CarbonError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            CarbonError::AlreadySubmitted(_)
            | CarbonError::InvalidProjectTransition { .. }
            | CarbonError::InvalidIssuanceTransition { .. }
            | CarbonError::ProjectNotApproved(_)
            | CarbonError::DuplicateBatch(_) => StatusCode::CONFLICT,
            CarbonError::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CarbonError::Store(e) => store_status(e),
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Duplicate(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the log.
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_types::{ParcelId, VerificationStatus};

    #[test]
    fn workflow_conflicts_map_to_409() {
        let not_verified: RpcError = NodeError::from(TokenizationError::NotVerified {
            parcel: ParcelId::new(1),
            status: VerificationStatus::Pending,
        })
        .into();
        assert_eq!(not_verified.status(), StatusCode::CONFLICT);

        let verified: RpcError =
            NodeError::from(VerificationError::AlreadyVerified(ParcelId::new(1))).into();
        assert_eq!(verified.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unsupported_method_is_unprocessable() {
        let e: RpcError =
            NodeError::from(VerificationError::UnsupportedMethod("drone".into())).into();
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn backend_failures_are_500() {
        let e: RpcError = NodeError::from(StoreError::Backend("disk full".into())).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
