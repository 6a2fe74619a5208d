//! Write batching: groups several record writes into a single LMDB write
//! transaction.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put(env.requests_db, &key, &record)?;
//! batch.put(env.parcels_db, &parcel.id.to_key(), &parcel)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).
//! LMDB admits one writer at a time, so reads made through the batch are a
//! consistent basis for compare-and-set writes.

use heed::types::Bytes;
use heed::{Database, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{decode, encode, read_u64};
use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, LmdbError> {
        let txn = env.env().write_txn()?;
        Ok(Self { txn })
    }

    /// Read a record as seen by this transaction, including its own writes.
    pub fn get<T: DeserializeOwned>(
        &self,
        db: Database<Bytes, Bytes>,
        key: &[u8],
    ) -> Result<Option<T>, LmdbError> {
        db.get(&self.txn, key)?.map(decode).transpose()
    }

    pub fn get_u64(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<Option<u64>, LmdbError> {
        db.get(&self.txn, key)?.map(read_u64).transpose()
    }

    pub fn contains(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<bool, LmdbError> {
        Ok(db.get(&self.txn, key)?.is_some())
    }

    /// Serialise and store a record.
    pub fn put<T: Serialize>(
        &mut self,
        db: Database<Bytes, Bytes>,
        key: &[u8],
        value: &T,
    ) -> Result<(), LmdbError> {
        let bytes = encode(value)?;
        db.put(&mut self.txn, key, &bytes)?;
        Ok(())
    }

    pub fn put_raw(
        &mut self,
        db: Database<Bytes, Bytes>,
        key: &[u8],
        value: &[u8],
    ) -> Result<(), LmdbError> {
        db.put(&mut self.txn, key, value)?;
        Ok(())
    }

    /// Returns whether the key existed.
    pub fn delete(&mut self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<bool, LmdbError> {
        Ok(db.delete(&mut self.txn, key)?)
    }

    /// Commit all batched operations in a single write transaction.
    pub fn commit(self) -> Result<(), LmdbError> {
        self.txn.commit()?;
        Ok(())
    }
}
