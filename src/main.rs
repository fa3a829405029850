use clap::{Parser, Subcommand};
use kaizen::{config::Config, node::Node};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Kaizen Layer 2 node
#[derive(Debug, Parser)]
#[command(name = "kaizen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the Layer 2 node
    Run {
        /// Start in developer mode with ephemeral defaults
        #[arg(long)]
        dev: bool,
        /// Run as Layer 2 node (default behavior)
        #[arg(long = "l2-mode")]
        l2_mode: bool,
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// The main entry point for the node binary.
///
/// Initializes logging, resolves the configuration, starts the node and
/// keeps it running until Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Command::Run { dev, l2_mode, config } = Cli::parse().command;

    let mut config = match (config, dev) {
        (Some(path), _) => Config::load(path)?,
        (None, true) => Config::dev(),
        (None, false) => Config::load("config/default.toml")?,
    };
    config.node.dev_mode |= dev;
    config.node.l2_mode |= l2_mode;
    info!("Node starting with config: {:?}", config);

    let token = CancellationToken::new();
    let mut node = Node::new(config);
    node.start(&token).await?;
    info!("Node started; press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    // Stop first so a final flushed batch is executed before the tasks exit
    node.stop().await?;
    token.cancel();

    Ok(())
}
