use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use nimbus_miner::{MinerAgent, MinerConfig};

/// Nimbus provider agent: registers with a node and completes polled tasks.
#[derive(Parser, Debug)]
#[command(name = "nimbus-miner", version)]
struct Cli {
    /// Wallet address to receive rewards (required)
    #[arg(long)]
    wallet: Option<String>,

    /// nimbus-node base URL
    #[arg(long)]
    node: Option<String>,

    /// Local port this agent advertises as its endpoint
    #[arg(long)]
    port: Option<u16>,

    /// GPU model string reported on registration
    #[arg(long)]
    gpu: Option<String>,

    /// Comma-separated list of models this provider can serve
    #[arg(long)]
    models: Option<String>,

    /// Local model/result cache directory
    #[arg(long)]
    cache: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("nimbus-miner: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = MinerConfig::new(cli.wallet, cli.node, cli.port, cli.gpu, cli.models, cli.cache)?;

    let agent = MinerAgent::new(config);
    agent.run(Duration::from_secs(10)).await
}
