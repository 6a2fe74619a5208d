//! The closed set of verification strategies.
//!
//! Dispatch is an exhaustive `match` on [`StrategyKind`], so adding a method
//! is a compile-time change rather than a lookup that can miss.

mod gps;
mod satellite;
mod survey;

pub use gps::GpsStrategy;
pub use satellite::{SatelliteStrategy, DEFAULT_RESOLUTION_METERS};
pub use survey::SurveyStrategy;

use serde::{Deserialize, Serialize};
use shamba_types::{LandParcel, Timestamp, VerificationMethod, VerificationOutcome};

use crate::VerificationError;

/// Material supplied with a verification request beyond the parcel itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Reference to an uploaded survey report.
    #[serde(default)]
    pub survey_document: Option<String>,
}

impl Evidence {
    pub fn with_survey(document: impl Into<String>) -> Self {
        Self {
            survey_document: Some(document.into()),
        }
    }
}

/// Methods that have a strategy behind them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Satellite,
    Gps,
    Survey,
}

impl TryFrom<VerificationMethod> for StrategyKind {
    type Error = VerificationError;

    fn try_from(method: VerificationMethod) -> Result<Self, Self::Error> {
        match method {
            VerificationMethod::Satellite => Ok(Self::Satellite),
            VerificationMethod::Gps => Ok(Self::Gps),
            VerificationMethod::Survey => Ok(Self::Survey),
            VerificationMethod::Manual => {
                Err(VerificationError::UnsupportedMethod(method.to_string()))
            }
        }
    }
}

impl From<StrategyKind> for VerificationMethod {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Satellite => Self::Satellite,
            StrategyKind::Gps => Self::Gps,
            StrategyKind::Survey => Self::Survey,
        }
    }
}

/// One instance of every strategy, built once from configuration.
pub struct StrategySet {
    pub satellite: SatelliteStrategy,
    pub gps: GpsStrategy,
    pub survey: SurveyStrategy,
}

impl StrategySet {
    /// Run the strategy for `kind`. Never fails: problems are folded into
    /// the outcome's `error`.
    pub async fn verify(
        &self,
        kind: StrategyKind,
        parcel: &LandParcel,
        evidence: &Evidence,
        now: Timestamp,
    ) -> VerificationOutcome {
        match kind {
            StrategyKind::Satellite => self.satellite.verify(parcel).await,
            StrategyKind::Gps => self.gps.verify(parcel),
            StrategyKind::Survey => self.survey.verify(evidence, now),
        }
    }
}
