use shamba_store::StoreError;
use shamba_types::{
    IssuanceId, IssuanceStatus, ParcelId, PracticeVerificationId, ProjectId, ProjectStatus,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarbonError {
    #[error("carbon project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("issuance {0} not found")]
    IssuanceNotFound(IssuanceId),

    #[error("practice verification {0} not found")]
    PracticeVerificationNotFound(PracticeVerificationId),

    #[error("parcel {0} not found")]
    ParcelNotFound(ParcelId),

    #[error("requester is not allowed to {0}")]
    NotAuthorized(&'static str),

    #[error("Project already submitted")]
    AlreadySubmitted(ProjectId),

    #[error("cannot {action} a project that is {status}")]
    InvalidProjectTransition {
        action: &'static str,
        status: ProjectStatus,
    },

    #[error("cannot {action} an issuance that is {status}")]
    InvalidIssuanceTransition {
        action: &'static str,
        status: IssuanceStatus,
    },

    #[error("issuances require an approved project, project {0} is not approved")]
    ProjectNotApproved(ProjectId),

    #[error("batch number {0} is already used")]
    DuplicateBatch(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl CarbonError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
