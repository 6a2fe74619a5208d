//! HTTP API for the Shamba registry.
//!
//! Provides endpoints for:
//! - Farmer onboarding, ledger accounts and balance refresh
//! - Parcel registration and lookup
//! - Verification requests and their audit trail
//! - Land tokenization
//! - The carbon-credit lifecycle
//! - Health and Prometheus metrics
//!
//! Callers are authenticated upstream; the gateway forwards the acting user
//! in the `x-user-id` and `x-user-role` headers (see [`Identity`]).

pub mod error;
pub mod handlers;
pub mod identity;
pub mod server;

pub use error::RpcError;
pub use identity::Identity;
pub use server::{router, AppState, RpcServer};
