//! Fundamental types for the Shamba land registry.
//!
//! This crate defines the records shared across every other crate in the
//! workspace: identifiers, timestamps, areas, ledger amounts, land parcels,
//! verification audit records, land tokens, farmer profiles and the
//! carbon-credit persistence shapes.

pub mod amount;
pub mod area;
pub mod carbon;
pub mod error;
pub mod farmer;
pub mod ids;
pub mod parcel;
pub mod time;
pub mod token;
pub mod verification;

pub use amount::Tinybars;
pub use area::Hectares;
pub use carbon::{
    CarbonCreditIssuance, CarbonCreditProject, CarbonStandard, Co2eTonnes, EvidenceKind,
    IssuanceStatus, Methodology, PracticeStatus, PracticeVerification, PracticeVerificationType,
    ProjectStatus, SensorReading, SensorSource, SensorType, VerificationEvidence,
};
pub use error::ShambaError;
pub use farmer::{FarmerProfile, LedgerAccountRecord, Requester, Role};
pub use ids::{
    EvidenceId, FarmerId, IssuanceId, ParcelId, PracticeVerificationId, ProjectId, RequestId,
    SensorReadingId, UserId,
};
pub use parcel::{LandParcel, StatusTransition, VerificationMethod, VerificationStatus};
pub use time::Timestamp;
pub use token::LandToken;
pub use verification::{RequestStatus, VerificationOutcome, VerificationRequest};
