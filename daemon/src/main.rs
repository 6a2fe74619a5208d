//! Shamba daemon: entry point for running the land registry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shamba_node::{init_logging, open_registry, NodeConfig, ShutdownController};
use shamba_rpc::RpcServer;

#[derive(Parser)]
#[command(name = "shamba-daemon", about = "Shamba land registry daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and environment variables override them.
    #[arg(long, env = "SHAMBA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, env = "SHAMBA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port.
    #[arg(long, env = "SHAMBA_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log output: "human" or "json".
    #[arg(long, env = "SHAMBA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, env = "SHAMBA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Serve Prometheus metrics at /metrics.
    #[arg(long, env = "SHAMBA_ENABLE_METRICS")]
    metrics: bool,

    /// Ledger network used in DIDs, e.g. "testnet".
    #[arg(long, env = "SHAMBA_NETWORK")]
    network: Option<String>,

    /// Base URL of the ledger relay.
    #[arg(long, env = "SHAMBA_LEDGER_RELAY_URL")]
    relay_url: Option<String>,

    #[arg(long, env = "SENTINEL_CLIENT", hide_env_values = true)]
    sentinel_client: Option<String>,

    #[arg(long, env = "SENTINEL_SECRET", hide_env_values = true)]
    sentinel_secret: Option<String>,

    #[arg(long, env = "LEDGER_OPERATOR_ID")]
    operator_id: Option<String>,

    /// Hex Ed25519 seed of the platform operator.
    #[arg(long, env = "LEDGER_OPERATOR_KEY", hide_env_values = true)]
    operator_key: Option<String>,

    /// Hex 32-byte key sealing farmer keys at rest.
    #[arg(long, env = "SHAMBA_VAULT_KEY", hide_env_values = true)]
    vault_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open the registry and serve the HTTP API until SIGINT/SIGTERM.
    Run,
    /// Validate the effective configuration and print it with secrets hidden.
    CheckConfig,
}

impl Cli {
    fn config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.enable_metrics |= self.metrics;
        if let Some(network) = &self.network {
            config.ledger.network = network.clone();
        }
        if let Some(url) = &self.relay_url {
            config.ledger.relay_url = url.clone();
        }
        if let Some(id) = &self.sentinel_client {
            config.imagery.client_id = id.clone();
        }
        if let Some(secret) = &self.sentinel_secret {
            config.imagery.client_secret = secret.clone();
        }
        if let Some(id) = &self.operator_id {
            config.ledger.operator_id = id.clone();
        }
        if let Some(key) = &self.operator_key {
            config.ledger.operator_key = Some(key.clone());
        }
        if let Some(key) = &self.vault_key {
            config.vault_key = Some(key.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::CheckConfig => {
            println!("{}", config.redacted().to_toml_string()?);
        }
        Command::Run => run(config).await?,
    }
    Ok(())
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        metrics = config.enable_metrics,
        "starting Shamba registry"
    );

    let registry = Arc::new(open_registry(&config).context("opening registry")?);
    let server = RpcServer::new(config.rpc_port, registry, config.enable_metrics);

    let shutdown = Arc::new(ShutdownController::new());
    let stopped = shutdown.stopped();
    let signals = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.wait_for_signal().await })
    };

    server.start(stopped).await?;

    signals.abort();
    tracing::info!("Shamba daemon exited cleanly");
    Ok(())
}
