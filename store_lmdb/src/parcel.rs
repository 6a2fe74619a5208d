//! LMDB implementation of ParcelStore.

use shamba_store::{ParcelStore, StoreError};
use shamba_types::{FarmerId, LandParcel, ParcelId};

use crate::codec::{get_record, pair_key, scan_prefix_keys};
use crate::{LmdbEnvironment, LmdbError};

impl ParcelStore for LmdbEnvironment {
    fn put_parcel(&self, parcel: &LandParcel) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put(self.parcels_db, &parcel.id.to_key(), parcel)?;
        batch.put_raw(
            self.farmer_parcels_db,
            &pair_key(parcel.farmer.to_key(), parcel.id.to_key()),
            &[],
        )?;
        batch.commit()?;
        Ok(())
    }

    fn get_parcel(&self, id: ParcelId) -> Result<LandParcel, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        get_record(&self.parcels_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("parcel {id}")))
    }

    fn parcels_for_farmer(&self, farmer: FarmerId) -> Result<Vec<LandParcel>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut parcels = Vec::new();
        for id in scan_prefix_keys(&self.farmer_parcels_db, &rtxn, farmer.to_key())? {
            let parcel = get_record(&self.parcels_db, &rtxn, &id)?.ok_or_else(|| {
                StoreError::Corruption(format!(
                    "farmer {farmer} indexes missing parcel {}",
                    u64::from_be_bytes(id)
                ))
            })?;
            parcels.push(parcel);
        }
        Ok(parcels)
    }
}
