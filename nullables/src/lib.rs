//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the registry (storage, ledger, imagery
//! provider) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be scripted and made to fail on demand
//! - Count calls so tests can assert what was (not) invoked
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod imagery;
pub mod ledger;
pub mod store;

pub use imagery::NullImagery;
pub use ledger::NullLedger;
pub use store::NullStore;
