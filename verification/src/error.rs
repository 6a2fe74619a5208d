use shamba_store::StoreError;
use shamba_types::ParcelId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("unsupported verification method: {0}")]
    UnsupportedMethod(String),

    #[error("parcel {0} not found")]
    ParcelNotFound(ParcelId),

    #[error("requester may not verify parcel {0}")]
    NotAuthorized(ParcelId),

    #[error("parcel {0} is already verified")]
    AlreadyVerified(ParcelId),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
