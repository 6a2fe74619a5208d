//! Carbon-credit lifecycle.
//!
//! A farmer proposes a project on one of their parcels, staff review it,
//! and approved projects accrue issuances that are eventually retired.
//! Practice verifications, evidence and sensor readings are the supporting
//! trail. Every operation takes the acting [`Requester`](shamba_types::Requester)
//! and enforces owner-or-staff access itself.

pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod requests;

pub use error::CarbonError;
pub use lifecycle::{IssuanceAction, ProjectAction};
pub use registry::CarbonRegistry;
pub use requests::{NewEvidence, NewIssuance, NewPracticeVerification, NewProject, NewSensorReading};
