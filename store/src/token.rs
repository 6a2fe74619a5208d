//! Land token storage with a per-parcel uniqueness slot.

use serde::{Deserialize, Serialize};
use shamba_types::{LandToken, ParcelId};

use crate::StoreError;

/// What occupies a parcel's token slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenSlot {
    /// A tokenization is in flight.
    Reserved,
    Minted(LandToken),
}

pub trait LandTokenStore {
    /// Claim the parcel's token slot.
    ///
    /// Compare-and-set: fails with [`StoreError::Duplicate`] if the slot
    /// holds a reservation or a minted token.
    fn reserve_token(&self, parcel: ParcelId) -> Result<(), StoreError>;

    /// Replace the reservation with the minted token.
    ///
    /// Fails with [`StoreError::Duplicate`] if a token is already stored and
    /// [`StoreError::NotFound`] if there is no reservation.
    fn complete_token(&self, token: &LandToken) -> Result<(), StoreError>;

    /// Drop a reservation after a failed mint. A minted token is left alone.
    fn release_token_reservation(&self, parcel: ParcelId) -> Result<(), StoreError>;

    fn get_land_token(&self, parcel: ParcelId) -> Result<Option<LandToken>, StoreError>;
}
