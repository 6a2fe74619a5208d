//! Land parcels and their verification state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FarmerId, Hectares, ParcelId, ShambaError, Timestamp, UserId};

/// Verification status of a land parcel.
///
/// `Unverified → Pending → {Verified | Rejected}`, with re-entry into
/// `Pending` from `Unverified` or `Rejected`. `Verified` is terminal: it is
/// the precondition of an irreversible mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a new verification attempt may start from this status.
    pub fn accepts_attempt(&self) -> bool {
        !matches!(self, Self::Verified)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a parcel's boundaries were verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Satellite imagery analysis by an external provider.
    Satellite,
    /// Farmer-recorded GPS polygon cross-checked against the declared area.
    Gps,
    /// Professional survey report.
    Survey,
    /// Manual review by staff. Recorded on parcels but has no automated strategy.
    Manual,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satellite => "satellite",
            Self::Gps => "gps",
            Self::Survey => "survey",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMethod {
    type Err = ShambaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "satellite" => Ok(Self::Satellite),
            "gps" => Ok(Self::Gps),
            "survey" => Ok(Self::Survey),
            "manual" => Ok(Self::Manual),
            _ => Err(ShambaError::UnknownVariant {
                kind: "verification method",
                value: s.to_string(),
            }),
        }
    }
}

/// A physical plot claimed by one farmer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandParcel {
    pub id: ParcelId,
    pub farmer: FarmerId,
    pub title_deed_number: Option<String>,
    /// Declared area in hectares.
    pub total_area: Hectares,
    /// JSON array of `[longitude, latitude]` pairs, as submitted.
    pub gps_coordinates: String,
    pub address: String,
    pub country: String,
    pub region: String,
    pub verification_status: VerificationStatus,
    pub verification_method: Option<VerificationMethod>,
    pub verified_by: Option<UserId>,
    pub verification_date: Option<Timestamp>,
    /// Content address of the stored land documents, if any.
    pub document_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LandParcel {
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// Stamp a successful verification. Method, verifier and date are only
    /// ever set together, through this call.
    fn mark_verified(&mut self, method: VerificationMethod, verifier: UserId, at: Timestamp) {
        self.verification_status = VerificationStatus::Verified;
        self.verification_method = Some(method);
        self.verified_by = Some(verifier);
        self.verification_date = Some(at);
        self.updated_at = at;
    }
}

/// A status change requested by the verification workflow.
///
/// Stores apply the transition inside the same write transaction as the
/// audit record via [`StatusTransition::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTransition {
    /// An attempt started.
    Pending,
    /// The attempt produced a valid outcome.
    Verified {
        method: VerificationMethod,
        verifier: UserId,
        at: Timestamp,
    },
    /// The attempt was well-formed but the evidence did not check out.
    Rejected,
    /// The attempt failed; put back the status held before it started.
    Restore(VerificationStatus),
}

impl StatusTransition {
    /// Apply to `parcel`, returning whether anything changed.
    ///
    /// A verified parcel is never moved, and `Restore` only unwinds a parcel
    /// that is still `Pending` so a concurrent success is not clobbered.
    pub fn apply(&self, parcel: &mut LandParcel, now: Timestamp) -> bool {
        if parcel.is_verified() {
            return false;
        }
        match *self {
            Self::Pending => parcel.verification_status = VerificationStatus::Pending,
            Self::Verified {
                method,
                verifier,
                at,
            } => {
                parcel.mark_verified(method, verifier, at);
                return true;
            }
            Self::Rejected => parcel.verification_status = VerificationStatus::Rejected,
            Self::Restore(previous) => {
                if parcel.verification_status != VerificationStatus::Pending
                    || previous == VerificationStatus::Verified
                {
                    return false;
                }
                parcel.verification_status = previous;
            }
        }
        parcel.updated_at = now;
        true
    }
}
