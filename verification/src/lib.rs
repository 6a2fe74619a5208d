//! Land parcel verification.
//!
//! Verification methods differ in how much they can be trusted: satellite
//! imagery is measured independently, a GPS polygon is self-reported but
//! cross-checked against the declared area, and a survey report is taken on
//! the surveyor's word. Each lives behind the same
//! `verify(parcel, evidence) -> VerificationOutcome` contract in
//! [`strategy`], and the [`VerificationCoordinator`] drives the parcel's
//! status from the outcome without caring which method produced it.

pub mod coordinator;
pub mod error;
pub mod policy;
pub mod strategy;

pub use coordinator::{VerificationCoordinator, VerificationReport};
pub use error::VerificationError;
pub use policy::{VerificationPolicy, DEFAULT_GPS_TOLERANCE};
pub use strategy::{
    Evidence, GpsStrategy, SatelliteStrategy, StrategyKind, StrategySet, SurveyStrategy,
    DEFAULT_RESOLUTION_METERS,
};

use shamba_types::VerificationMethod;

/// Parse a requested method name, rejecting anything without a strategy.
pub fn parse_method(name: &str) -> Result<VerificationMethod, VerificationError> {
    let method: VerificationMethod = name
        .parse()
        .map_err(|_| VerificationError::UnsupportedMethod(name.to_string()))?;
    StrategyKind::try_from(method)?;
    Ok(method)
}
