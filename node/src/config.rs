//! Node configuration with TOML file support.
//!
//! Secrets (imagery client secret, ledger operator key, vault key) may be
//! left out of the file and supplied through the environment by the daemon.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use shamba_crypto::{keypair_from_hex, KeyVault};
use shamba_imagery::{ImageryCredentials, SentinelHubConfig, DEFAULT_BASE_URL};
use shamba_ledger::LedgerClientConfig;
use shamba_types::Tinybars;
use shamba_verification::{
    VerificationPolicy, DEFAULT_GPS_TOLERANCE, DEFAULT_RESOLUTION_METERS,
};

use crate::{LogFormat, NodeError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "info,shamba_ledger=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Serve Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Hex 32-byte key sealing farmer private keys at rest.
    #[serde(default)]
    pub vault_key: Option<String>,

    #[serde(default)]
    pub imagery: ImageryConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryConfig {
    #[serde(default = "default_imagery_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_resolution")]
    pub resolution_meters: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Network name used in issued DIDs.
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub operator_id: String,
    /// Hex Ed25519 seed of the operator account.
    #[serde(default)]
    pub operator_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Funding for each new farmer account, in tinybars.
    #[serde(default = "default_initial_balance")]
    pub initial_account_balance: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_gps_tolerance")]
    pub gps_tolerance: f64,
    /// Minimum satellite match percentage; unset accepts any HTTP 200.
    #[serde(default)]
    pub min_satellite_match: Option<f64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./shamba_data")
}

fn default_rpc_port() -> u16 {
    8080
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_imagery_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION_METERS
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_relay_url() -> String {
    "http://127.0.0.1:5600".to_string()
}

fn default_initial_balance() -> u64 {
    Tinybars::PER_HBAR
}

fn default_gps_tolerance() -> f64 {
    DEFAULT_GPS_TOLERANCE
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: default_imagery_url(),
            client_id: String::new(),
            client_secret: String::new(),
            resolution_meters: default_resolution(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            relay_url: default_relay_url(),
            operator_id: String::new(),
            operator_key: None,
            timeout_secs: default_timeout_secs(),
            initial_account_balance: default_initial_balance(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            gps_tolerance: default_gps_tolerance(),
            min_satellite_match: None,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_port: default_rpc_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            lmdb_map_size: default_map_size(),
            vault_key: None,
            imagery: ImageryConfig::default(),
            ledger: LedgerConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// Reject settings no component could run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        let tolerance = self.policy.gps_tolerance;
        if !tolerance.is_finite() || !(0.0..1.0).contains(&tolerance) {
            return Err(NodeError::Config(format!(
                "policy.gps_tolerance must be in [0, 1), got {tolerance}"
            )));
        }
        if let Some(threshold) = self.policy.min_satellite_match {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(NodeError::Config(format!(
                    "policy.min_satellite_match must be a percentage, got {threshold}"
                )));
            }
        }
        if self.imagery.resolution_meters == 0 {
            return Err(NodeError::Config("imagery.resolution_meters must be positive".into()));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn verification_policy(&self) -> VerificationPolicy {
        VerificationPolicy {
            gps_tolerance: self.policy.gps_tolerance,
            min_satellite_match: self.policy.min_satellite_match,
        }
    }

    pub fn imagery_credentials(&self) -> ImageryCredentials {
        ImageryCredentials {
            client_id: self.imagery.client_id.clone(),
            client_secret: self.imagery.client_secret.clone(),
        }
    }

    pub fn sentinel_hub(&self) -> SentinelHubConfig {
        SentinelHubConfig {
            base_url: self.imagery.base_url.clone(),
            timeout: Duration::from_secs(self.imagery.timeout_secs),
        }
    }

    pub fn ledger_client(&self) -> Result<LedgerClientConfig, NodeError> {
        if self.ledger.operator_id.trim().is_empty() {
            return Err(NodeError::Config("ledger.operator_id is not set".into()));
        }
        let key = self
            .ledger
            .operator_key
            .as_deref()
            .ok_or_else(|| NodeError::Config("ledger.operator_key is not set".into()))?;
        Ok(LedgerClientConfig {
            relay_url: self.ledger.relay_url.clone(),
            operator_id: self.ledger.operator_id.trim().to_string(),
            operator_key: keypair_from_hex(key)?,
            timeout: Duration::from_secs(self.ledger.timeout_secs),
        })
    }

    pub fn key_vault(&self) -> Result<KeyVault, NodeError> {
        let key = self
            .vault_key
            .as_deref()
            .ok_or_else(|| NodeError::Config("vault_key is not set".into()))?;
        Ok(KeyVault::from_hex(key)?)
    }

    pub fn initial_account_balance(&self) -> Tinybars {
        Tinybars::new(self.ledger.initial_account_balance)
    }

    /// A copy safe to print: secrets are replaced by a marker.
    pub fn redacted(&self) -> Self {
        const HIDDEN: &str = "<redacted>";
        let mut copy = self.clone();
        if !copy.imagery.client_secret.is_empty() {
            copy.imagery.client_secret = HIDDEN.into();
        }
        if copy.ledger.operator_key.is_some() {
            copy.ledger.operator_key = Some(HIDDEN.into());
        }
        if copy.vault_key.is_some() {
            copy.vault_key = Some(HIDDEN.into());
        }
        copy
    }
}
