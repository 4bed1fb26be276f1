//! Line-oriented host for the lqbridge runtime.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: lqbridge.toml in the current directory, regtest
//! cargo run -p lqbridge-cli
//!
//! # Custom config, data directory and network
//! CONFIG=/etc/lqbridge.toml cargo run -p lqbridge-cli -- --data-dir /tmp/wallet --network testnet
//!
//! # Verbose logging
//! RUST_LOG=debug cargo run -p lqbridge-cli
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to the TOML configuration file (default: `lqbridge.toml`)
//! - `RUST_LOG` - Log filter (default: `info`)
//! - `.env` in the current directory is loaded first

use std::path::PathBuf;

use clap::Parser;
use lqbridge::simulated::SimulatedConnector;
use lqbridge::{LiquidBridge, SessionStatus};
use lqbridge_cli::config::DEFAULT_CONFIG_PATH;
use lqbridge_cli::{CliConfig, SigDown, repl};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "lqbridge", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Default wallet data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Network for the startup connect.
    #[arg(long)]
    network: Option<String>,
}

#[tokio::main]
#[allow(clippy::print_stderr)] // config errors can precede the subscriber
async fn main() {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("lqbridge failed: {e}");
        eprintln!("lqbridge: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(bridge: &LiquidBridge) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    #[cfg(feature = "telemetry")]
    registry
        .with(lqbridge::logger::LogForwardLayer::new(bridge.events().clone()))
        .init();

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = bridge;
        registry.init();
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::load(&args.config)?;
    if let Some(dir) = args.data_dir {
        config.bridge.data_dir = Some(dir);
    }
    if let Some(network) = args.network {
        config.network = network;
    }

    let bridge = LiquidBridge::with_config(
        SimulatedConnector::with_balance(config.initial_balance_sat),
        config.bridge.clone(),
    );
    init_tracing(&bridge);
    tracing::info!(
        config = %args.config.display(),
        network = %config.network,
        data_dir = ?config.bridge.data_dir,
        "Loaded configuration"
    );

    bridge.set_logger(repl::print_delivery).await?;

    match config.connect_request() {
        Some(request) => {
            bridge.connect(&request).await?;
            tracing::info!(network = %config.network, "Wallet connected");
        }
        None if config.mnemonic.is_some() => {
            tracing::warn!("Mnemonic not resolved (missing env var?), waiting for connect");
        }
        None => tracing::info!("No mnemonic configured, waiting for connect"),
    }

    let sig_down = SigDown::try_new()?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&bridge, stdin, tokio::io::stdout(), &sig_down.token()).await?;
    sig_down.finish().await;

    if bridge.status() == SessionStatus::Connected {
        if let Err(failure) = bridge.disconnect().await {
            tracing::warn!(%failure, "Disconnect failed");
        }
    }
    bridge.shutdown().await;
    tracing::info!("lqbridge shut down");
    Ok(())
}
