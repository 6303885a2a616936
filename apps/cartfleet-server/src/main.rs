use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cart_fleet::api::rest::router;
use cart_fleet::bootstrap::build_state;
use cart_fleet::config::CartFleetConfig;

/// Cart fleet management server
#[derive(Parser)]
#[command(name = "cartfleet-server")]
#[command(about = "Cart fleet management server")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

/// Layered config: defaults -> YAML (if provided) -> env (CARTFLEET__*)
/// -> CLI overrides.
fn load_config(cli: &Cli) -> Result<CartFleetConfig> {
    let mut figment = Figment::from(Serialized::defaults(CartFleetConfig::default()));
    if let Some(path) = &cli.config {
        if !Path::new(path).is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed("CARTFLEET__").split("__"));

    let mut config: CartFleetConfig = figment.extract().context("invalid configuration")?;
    if let Some(port) = cli.port {
        let host = config
            .server
            .bind_addr
            .rsplit_once(':')
            .map_or("127.0.0.1", |(host, _)| host)
            .to_owned();
        config.server.bind_addr = format!("{host}:{port}");
    }
    Ok(config)
}

fn init_logging(config: &CartFleetConfig, verbose: u8) {
    let default_filter = match verbose {
        0 => config.logging.filter.clone(),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if matches!(cli.command, Some(Commands::Check)) {
        println!("configuration OK");
        return Ok(());
    }

    init_logging(&config, cli.verbose);

    let state = build_state(&config)?;
    let app = router(state);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "cartfleet-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}
