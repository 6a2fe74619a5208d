//! Acceptance policy applied on top of strategy outcomes.

use serde::{Deserialize, Serialize};
use shamba_types::VerificationOutcome;
use tracing::warn;

/// Default GPS tolerance: the computed area may differ from the declared
/// area by up to 10% of the declared area.
pub const DEFAULT_GPS_TOLERANCE: f64 = 0.10;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationPolicy {
    /// Fraction of the declared area the GPS computation may deviate by.
    pub gps_tolerance: f64,
    /// Minimum satellite match percentage. `None` accepts any successful
    /// provider response.
    pub min_satellite_match: Option<f64>,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            gps_tolerance: DEFAULT_GPS_TOLERANCE,
            min_satellite_match: None,
        }
    }
}

impl VerificationPolicy {
    /// Gate an accepted satellite outcome on the configured match threshold.
    ///
    /// A match below the threshold is a rejection, not a failed attempt: the
    /// provider answered, the land just did not match well enough.
    pub fn apply_satellite_threshold(&self, outcome: VerificationOutcome) -> VerificationOutcome {
        if !outcome.is_accepted() {
            return outcome;
        }
        let Some(required) = self.min_satellite_match else {
            warn!(
                match_percentage = ?outcome.match_percentage,
                "no satellite match threshold configured, accepting provider result"
            );
            return outcome;
        };
        match outcome.match_percentage {
            Some(found) if found >= required => outcome,
            Some(found) => VerificationOutcome {
                valid: false,
                note: Some(format!(
                    "Satellite match {found:.1}% is below the required {required:.1}%"
                )),
                ..outcome
            },
            None => VerificationOutcome {
                valid: false,
                error: Some("Satellite provider reported no match percentage".to_string()),
                ..outcome
            },
        }
    }
}
