//! Land tokenization.
//!
//! A verified parcel is minted exactly once as a non-fungible ledger token
//! whose administrative keys stay with the platform operator. The parcel's
//! token slot is reserved in storage before the ledger is touched, so two
//! concurrent requests for the same parcel cannot both reach the mint.

pub mod error;
pub mod metadata;
pub mod service;

pub use error::TokenizationError;
pub use metadata::TokenMetadata;
pub use service::{TokenResult, TokenizationService};
