//! Id counters kept in the meta database.

use shamba_store::{Sequence, SequenceStore, StoreError};

use crate::LmdbEnvironment;

impl SequenceStore for LmdbEnvironment {
    fn next_id(&self, seq: Sequence) -> Result<u64, StoreError> {
        let mut batch = self.write_batch()?;
        let next = batch.get_u64(self.meta_db, seq.key())?.unwrap_or(0) + 1;
        batch.put_raw(self.meta_db, seq.key(), &next.to_be_bytes())?;
        batch.commit()?;
        Ok(next)
    }
}
