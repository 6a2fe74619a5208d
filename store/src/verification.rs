//! Verification audit trail and parcel status transitions.

use shamba_types::{
    LandParcel, ParcelId, RequestId, StatusTransition, Timestamp, VerificationRequest,
    VerificationStatus,
};

use crate::{Sequence, SequenceStore, StoreError};

pub trait VerificationRequestStore: SequenceStore {
    fn next_request_id(&self) -> Result<RequestId, StoreError> {
        self.next_id(Sequence::VerificationRequest)
            .map(RequestId::new)
    }

    /// Move a parcel to `pending` unless it is already verified.
    ///
    /// Returns the status held before the call; `Verified` means nothing was
    /// written.
    fn begin_verification(
        &self,
        parcel: ParcelId,
        now: Timestamp,
    ) -> Result<VerificationStatus, StoreError>;

    /// Append `record` and apply `transition` to its parcel in one atomic
    /// write. Either both land or neither does. Returns the parcel as
    /// stored afterwards.
    fn commit_verification(
        &self,
        record: &VerificationRequest,
        transition: StatusTransition,
    ) -> Result<LandParcel, StoreError>;

    /// Undo a [`begin_verification`](Self::begin_verification) whose commit
    /// never landed, applying `StatusTransition::Restore(previous)`. A parcel
    /// that is no longer `pending` is left alone. Returns the parcel as
    /// stored afterwards.
    fn abandon_verification(
        &self,
        parcel: ParcelId,
        previous: VerificationStatus,
        now: Timestamp,
    ) -> Result<LandParcel, StoreError>;

    /// The audit trail for a parcel, oldest first.
    fn requests_for_parcel(&self, parcel: ParcelId)
        -> Result<Vec<VerificationRequest>, StoreError>;
}
