//! Wiring of the production backends.

use std::sync::Arc;

use shamba_imagery::SentinelHubClient;
use shamba_ledger::HttpLedgerClient;
use shamba_store_lmdb::LmdbEnvironment;
use tracing::info;

use crate::{LandRegistry, NodeConfig, NodeError, RegistrySettings};

/// Open the LMDB store under `config.data_dir` and connect the HTTP
/// gateways.
pub fn open_registry(config: &NodeConfig) -> Result<LandRegistry, NodeError> {
    let settings = RegistrySettings::from_config(config)?;
    let store = Arc::new(LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)?);
    let ledger = Arc::new(HttpLedgerClient::new(config.ledger_client()?)?);
    let imagery = Arc::new(SentinelHubClient::new(config.sentinel_hub())?);

    info!(
        data_dir = %config.data_dir.display(),
        network = %config.ledger.network,
        relay = %config.ledger.relay_url,
        min_satellite_match = ?config.policy.min_satellite_match,
        "registry opened"
    );
    LandRegistry::new(store, ledger, imagery, settings)
}
