//! Land parcel storage trait.

use shamba_types::{FarmerId, LandParcel, ParcelId};

use crate::{Sequence, SequenceStore, StoreError};

pub trait ParcelStore: SequenceStore {
    fn next_parcel_id(&self) -> Result<ParcelId, StoreError> {
        self.next_id(Sequence::Parcel).map(ParcelId::new)
    }

    /// Insert or overwrite a parcel record.
    fn put_parcel(&self, parcel: &LandParcel) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn get_parcel(&self, id: ParcelId) -> Result<LandParcel, StoreError>;

    /// Parcels owned by `farmer`, in id order.
    fn parcels_for_farmer(&self, farmer: FarmerId) -> Result<Vec<LandParcel>, StoreError>;
}
