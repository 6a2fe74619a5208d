use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageryError {
    /// The provider answered with a non-success status.
    #[error("imagery provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("imagery provider unreachable: {0}")]
    Transport(String),

    #[error("invalid imagery provider response: {0}")]
    Decode(String),
}
