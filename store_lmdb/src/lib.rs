//! LMDB storage backend for the Shamba registry.
//!
//! Implements every trait from `shamba-store` on [`LmdbEnvironment`] using
//! the `heed` LMDB bindings. Each record family maps to one LMDB database
//! (plus secondary index databases) within a single environment, so any
//! multi-record operation runs inside one write transaction.

pub mod carbon;
pub mod codec;
pub mod environment;
pub mod error;
pub mod farmer;
pub mod parcel;
pub mod sequence;
pub mod token;
pub mod verification;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use write_batch::WriteBatch;
