//! Verification outcomes and the append-only audit record of each attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ParcelId, RequestId, Timestamp, UserId, VerificationMethod};

/// Strategy-neutral result of one verification attempt.
///
/// `error` set means the attempt itself failed (bad input, provider down);
/// `valid == false` without an error means the evidence was examined and
/// did not check out. Callers must keep the two apart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub valid: bool,
    /// Area computed or reported by the strategy, in hectares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why a well-formed check did not pass. Unlike `error`, a note does not
    /// mark the attempt as failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl VerificationOutcome {
    /// The attempt could not be carried out.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Valid and error-free: the only outcome that may verify a parcel.
    pub fn is_accepted(&self) -> bool {
        self.valid && self.error.is_none()
    }

    /// Compact JSON used for the audit record's notes.
    pub fn to_notes(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

/// Outcome status of an audited verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one verification attempt. Immutable once written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: RequestId,
    pub parcel: ParcelId,
    pub requested_by: UserId,
    pub method: VerificationMethod,
    pub status: RequestStatus,
    /// Serialized [`VerificationOutcome`], including any error.
    pub notes: String,
    pub requested_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl VerificationRequest {
    /// Decode the outcome stored in `notes`.
    pub fn outcome(&self) -> Result<VerificationOutcome, serde_json::Error> {
        serde_json::from_str(&self.notes)
    }
}
