//! Shamba registry node.
//!
//! Everything the daemon needs beyond the domain crates:
//! - [`NodeConfig`]: TOML configuration with per-section defaults
//! - [`init_logging`]: the global tracing subscriber
//! - [`RegistryMetrics`]: the Prometheus registry
//! - [`LandRegistry`]: one facade over verification, tokenization,
//!   onboarding and the carbon lifecycle
//! - [`open_registry`]: the production wiring (LMDB + HTTP gateways)

pub mod config;
pub mod error;
pub mod logging;
pub mod metered;
pub mod metrics;
pub mod node;
pub mod onboarding;
pub mod registry;
pub mod shutdown;

pub use config::{ImageryConfig, LedgerConfig, NodeConfig, PolicyConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metered::MeteredLedger;
pub use metrics::RegistryMetrics;
pub use node::open_registry;
pub use onboarding::{farmer_did, NewFarmer, OnboardingService};
pub use registry::{LandRegistry, NewParcel, RegistrySettings};
pub use shutdown::ShutdownController;
