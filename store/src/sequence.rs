//! Monotonic record-id allocation.

use crate::StoreError;

/// One counter per record family. Ids start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sequence {
    Farmer,
    Parcel,
    VerificationRequest,
    Project,
    Issuance,
    PracticeVerification,
    Evidence,
    SensorReading,
}

impl Sequence {
    pub fn key(&self) -> &'static [u8] {
        match self {
            Self::Farmer => b"seq:farmer",
            Self::Parcel => b"seq:parcel",
            Self::VerificationRequest => b"seq:verification_request",
            Self::Project => b"seq:project",
            Self::Issuance => b"seq:issuance",
            Self::PracticeVerification => b"seq:practice_verification",
            Self::Evidence => b"seq:evidence",
            Self::SensorReading => b"seq:sensor_reading",
        }
    }
}

pub trait SequenceStore {
    /// Allocate the next id of `seq`. Never returns the same id twice.
    fn next_id(&self, seq: Sequence) -> Result<u64, StoreError>;
}
