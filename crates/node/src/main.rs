use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use nimbus_node::{load_config, CliOverrides};
use tracing::info;

/// Nimbus control-plane node: attestation, scheduling and reward ledger
/// behind an OpenAI-compatible HTTP surface.
#[derive(Parser, Debug)]
#[command(name = "nimbus-node", version)]
struct Cli {
    /// Path to a TOML config file (default: ~/.nimbus/node.toml)
    #[arg(long)]
    config: Option<String>,

    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Data directory
    #[arg(long)]
    data: Option<String>,

    /// Node name
    #[arg(long)]
    node: Option<String>,

    /// Enable wildcard CORS
    #[arg(long)]
    cors: bool,

    /// Comma-separated model catalog to serve
    #[arg(long, default_value = "llama-3.1-70b")]
    models: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("nimbus-node: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        port: cli.port,
        data_dir: cli.data.clone(),
        node_name: cli.node.clone(),
        cors_enabled: if cli.cors { Some(true) } else { None },
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    let models: Vec<String> = cli.models.split(',').map(|s| s.trim().to_string()).collect();

    info!(port = config.port, node_name = %config.node_name, "starting nimbus-node");

    let state = nimbus_node::AppState::new(config.clone(), models);
    let tick_state = state.clone();
    let tick_interval = Duration::from_secs(config.tick_interval_secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tick_interval).await;
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            tick_state.scheduler.tick(now).await;
        }
    });

    let metrics_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    tokio::spawn(async move {
        if let Err(e) = nimbus_metrics::exporter::start_metrics_exporter(metrics_addr).await {
            tracing::error!(error = %e, "metrics exporter exited");
        }
    });

    let routes = nimbus_node::http::routes(state);
    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;
    Ok(())
}
