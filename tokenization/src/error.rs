use shamba_ledger::LedgerError;
use shamba_store::StoreError;
use shamba_types::{ParcelId, VerificationStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizationError {
    #[error("parcel {0} not found")]
    ParcelNotFound(ParcelId),

    #[error("requester may not tokenize parcel {0}")]
    NotAuthorized(ParcelId),

    #[error("parcel {parcel} is {status}, only verified parcels can be tokenized")]
    NotVerified {
        parcel: ParcelId,
        status: VerificationStatus,
    },

    #[error("parcel {0} is already tokenized")]
    AlreadyTokenized(ParcelId),

    #[error("ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    /// The ledger minted the token but the registry could not store it.
    #[error(
        "token {token_id} (serial {serial_number}, transaction {transaction_id}) \
         was minted for parcel {parcel} but could not be recorded: {source}"
    )]
    Unrecorded {
        parcel: ParcelId,
        token_id: String,
        transaction_id: String,
        serial_number: u64,
        source: StoreError,
    },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("could not encode token metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}
