use thiserror::Error;

use crate::ReceiptStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The relay answered with a non-success HTTP status.
    #[error("ledger provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    /// The ledger processed the transaction but its receipt is not SUCCESS.
    #[error("ledger operation {operation} failed with receipt status {status}")]
    Receipt {
        operation: &'static str,
        status: ReceiptStatus,
    },

    #[error("ledger unreachable: {0}")]
    Transport(String),

    #[error("invalid ledger response: {0}")]
    Decode(String),
}
