//! The on-chain representation of a verified parcel.

use serde::{Deserialize, Serialize};

use crate::{ParcelId, Timestamp};

/// One-time ledger token minted for a verified parcel.
///
/// A parcel has at most one `LandToken`; there is no update path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandToken {
    pub parcel: ParcelId,
    /// Ledger token identifier, e.g. `0.0.48213`.
    pub token_id: String,
    pub serial_number: u64,
    /// JSON metadata frozen at mint time.
    pub metadata: String,
    pub mint_transaction_id: String,
    pub minted_at: Timestamp,
    pub is_active: bool,
}
