//! LMDB implementation of VerificationRequestStore.
//!
//! Audit records use composite keys `parcel ++ request` so each attempt is
//! its own key/value pair and a parcel's trail is a prefix range-scan. The
//! record and the parcel transition are written in one transaction.

use shamba_store::{StoreError, VerificationRequestStore};
use shamba_types::{
    LandParcel, ParcelId, StatusTransition, Timestamp, VerificationRequest, VerificationStatus,
};
use tracing::debug;

use crate::codec::{pair_key, scan_prefix_values};
use crate::{LmdbEnvironment, LmdbError};

impl VerificationRequestStore for LmdbEnvironment {
    fn begin_verification(
        &self,
        parcel_id: ParcelId,
        now: Timestamp,
    ) -> Result<VerificationStatus, StoreError> {
        let mut batch = self.write_batch()?;
        let mut parcel: LandParcel = batch
            .get(self.parcels_db, &parcel_id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("parcel {parcel_id}")))?;
        let previous = parcel.verification_status;
        if StatusTransition::Pending.apply(&mut parcel, now) {
            batch.put(self.parcels_db, &parcel_id.to_key(), &parcel)?;
            batch.commit()?;
        }
        Ok(previous)
    }

    fn commit_verification(
        &self,
        record: &VerificationRequest,
        transition: StatusTransition,
    ) -> Result<LandParcel, StoreError> {
        let mut batch = self.write_batch()?;
        let parcel_key = record.parcel.to_key();
        let mut parcel: LandParcel = batch
            .get(self.parcels_db, &parcel_key)?
            .ok_or_else(|| StoreError::NotFound(format!("parcel {}", record.parcel)))?;

        let request_key = pair_key(parcel_key, record.id.to_key());
        if batch.contains(self.requests_db, &request_key)? {
            return Err(StoreError::Duplicate(format!("verification request {}", record.id)));
        }
        batch.put(self.requests_db, &request_key, record)?;

        let at = record.completed_at.unwrap_or(record.requested_at);
        if transition.apply(&mut parcel, at) {
            batch.put(self.parcels_db, &parcel_key, &parcel)?;
        } else {
            debug!(parcel_id = %record.parcel, ?transition, "status transition was a no-op");
        }
        batch.commit()?;
        Ok(parcel)
    }

    fn abandon_verification(
        &self,
        parcel_id: ParcelId,
        previous: VerificationStatus,
        now: Timestamp,
    ) -> Result<LandParcel, StoreError> {
        let mut batch = self.write_batch()?;
        let mut parcel: LandParcel = batch
            .get(self.parcels_db, &parcel_id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("parcel {parcel_id}")))?;
        if StatusTransition::Restore(previous).apply(&mut parcel, now) {
            batch.put(self.parcels_db, &parcel_id.to_key(), &parcel)?;
            batch.commit()?;
        }
        Ok(parcel)
    }

    fn requests_for_parcel(
        &self,
        parcel: ParcelId,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(scan_prefix_values(&self.requests_db, &rtxn, parcel.to_key())?)
    }
}
