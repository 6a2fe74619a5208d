//! Farmer profiles and their ledger accounts.

use shamba_types::{FarmerId, FarmerProfile, LedgerAccountRecord};

use crate::{Sequence, SequenceStore, StoreError};

pub trait FarmerStore: SequenceStore {
    fn next_farmer_id(&self) -> Result<FarmerId, StoreError> {
        self.next_id(Sequence::Farmer).map(FarmerId::new)
    }

    /// Store a new farmer together with their ledger account.
    ///
    /// Fails with [`StoreError::Duplicate`] if the email is taken; nothing is
    /// written in that case.
    fn put_farmer_with_account(
        &self,
        farmer: &FarmerProfile,
        account: &LedgerAccountRecord,
    ) -> Result<(), StoreError>;

    fn get_farmer(&self, id: FarmerId) -> Result<FarmerProfile, StoreError>;

    /// Case-insensitive lookup.
    fn find_farmer_by_email(&self, email: &str) -> Result<Option<FarmerProfile>, StoreError>;

    fn get_ledger_account(
        &self,
        farmer: FarmerId,
    ) -> Result<Option<LedgerAccountRecord>, StoreError>;

    /// Overwrite an existing ledger account (balance refresh).
    fn put_ledger_account(&self, account: &LedgerAccountRecord) -> Result<(), StoreError>;
}
