//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while parsing or validating the shared value types.
#[derive(Debug, Error, PartialEq)]
pub enum ShambaError {
    #[error("invalid area: {0}")]
    InvalidArea(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
