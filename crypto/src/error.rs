use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("sealed payload is too short")]
    TruncatedPayload,

    #[error("decryption failed: authentication check failed")]
    Unseal,

    #[error("encryption failed")]
    Seal,
}
