//! Persistence traits for the Shamba registry.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Operations that touch more than one record (a verification commit, a
//! token reservation, a farmer plus their ledger account) are single trait
//! methods so that each backend can run them inside one transaction.

pub mod carbon;
pub mod error;
pub mod farmer;
pub mod parcel;
pub mod sequence;
pub mod token;
pub mod verification;

pub use carbon::CarbonStore;
pub use error::StoreError;
pub use farmer::FarmerStore;
pub use parcel::ParcelStore;
pub use sequence::{Sequence, SequenceStore};
pub use token::{LandTokenStore, TokenSlot};
pub use verification::VerificationRequestStore;

/// Everything the registry needs from a backend, as one object-safe bound.
pub trait RegistryStore:
    ParcelStore + VerificationRequestStore + LandTokenStore + FarmerStore + CarbonStore + Send + Sync
{
}

impl<T> RegistryStore for T where
    T: ParcelStore
        + VerificationRequestStore
        + LandTokenStore
        + FarmerStore
        + CarbonStore
        + Send
        + Sync
{
}
