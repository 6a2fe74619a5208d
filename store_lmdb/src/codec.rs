//! Value encoding and key layout helpers.
//!
//! Values are bincode. Keys are big-endian ids so LMDB's byte ordering is
//! numeric ordering; secondary indexes use `owner ++ id` composite keys and
//! are listed with a prefix range-scan.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Build composite key `owner ++ id`.
pub(crate) fn pair_key(owner: [u8; 8], id: [u8; 8]) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&owner);
    key[8..].copy_from_slice(&id);
    key
}

/// Read a big-endian u64 stored as a value.
pub(crate) fn read_u64(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

pub(crate) fn get_record<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<T>, LmdbError> {
    db.get(txn, key)?.map(decode).transpose()
}

/// Collect every key under an 8-byte prefix of a composite-key index.
pub(crate) fn scan_prefix_keys(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: [u8; 8],
) -> Result<Vec<[u8; 8]>, LmdbError> {
    let lower = pair_key(prefix, [0u8; 8]);
    let upper = pair_key(prefix, [0xFF; 8]);
    let bounds = (
        Bound::Included(lower.as_slice()),
        Bound::Included(upper.as_slice()),
    );
    let mut ids = Vec::new();
    for entry in db.range(txn, &bounds)? {
        let (key, _) = entry?;
        let id: [u8; 8] = key
            .get(8..16)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| LmdbError::Serialization("malformed composite key".into()))?;
        ids.push(id);
    }
    Ok(ids)
}

/// Decode every value under an 8-byte prefix of a composite-key database.
pub(crate) fn scan_prefix_values<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: [u8; 8],
) -> Result<Vec<T>, LmdbError> {
    let lower = pair_key(prefix, [0u8; 8]);
    let upper = pair_key(prefix, [0xFF; 8]);
    let bounds = (
        Bound::Included(lower.as_slice()),
        Bound::Included(upper.as_slice()),
    );
    let mut values = Vec::new();
    for entry in db.range(txn, &bounds)? {
        let (_, value) = entry?;
        values.push(decode(value)?);
    }
    Ok(values)
}

/// Decode every value in a database, in key order.
pub(crate) fn scan_all<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<Vec<T>, LmdbError> {
    let mut values = Vec::new();
    for entry in db.iter(txn)? {
        let (_, value) = entry?;
        values.push(decode(value)?);
    }
    Ok(values)
}
