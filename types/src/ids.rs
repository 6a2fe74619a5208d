//! Numeric record identifiers.
//!
//! Every persisted record is keyed by a monotonically assigned `u64`. The
//! newtypes keep a parcel id from being passed where a farmer id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ShambaError;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            /// Big-endian key bytes, so LMDB key order matches numeric order.
            pub fn to_key(&self) -> [u8; 8] {
                self.0.to_be_bytes()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ShambaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| ShambaError::InvalidIdentifier(s.to_string()))
            }
        }
    };
}

record_id!(
    /// Identifies a land parcel.
    ParcelId
);
record_id!(
    /// Identifies a farmer profile.
    FarmerId
);
record_id!(
    /// Identifies an acting user (farmer or staff reviewer).
    UserId
);
record_id!(
    /// Identifies one verification attempt in the audit trail.
    RequestId
);
record_id!(
    /// Identifies a carbon-credit project.
    ProjectId
);
record_id!(
    /// Identifies a carbon-credit issuance batch.
    IssuanceId
);
record_id!(
    /// Identifies a practice verification visit or report.
    PracticeVerificationId
);
record_id!(
    /// Identifies an evidence attachment.
    EvidenceId
);
record_id!(
    /// Identifies a sensor reading.
    SensorReadingId
);

impl From<FarmerId> for UserId {
    /// Farmers act under the same numeric identity as their profile.
    fn from(id: FarmerId) -> Self {
        UserId(id.0)
    }
}
