//! `msme`: HTTP backend for the MSME ONE assistant.

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use msme_rs::config::{LayeredConfigOptions, MsmeConfig};
use msme_rs::server::{AppState, build_router};
use msme_rs::{apply_env_overrides, init_logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

/// Command-line options for the server.
#[derive(Parser)]
#[command(name = "msme", version)]
struct Cli {
    /// Extra msme.json5 layer applied over the user and cwd layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long)]
    addr: Option<String>,
    /// Chat-log document path
    #[arg(long)]
    chatlog: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(
        "starting msme (config_set={}, addr_set={}, chatlog_set={})",
        cli.config.is_some(),
        cli.addr.is_some(),
        cli.chatlog.is_some()
    );

    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered =
        MsmeConfig::load_layered_with_options(options).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }
    if let Some(path) = cli.chatlog {
        config.chatlog.path = path;
    }
    config.validate().context("invalid effective config")?;

    let state = AppState::from_config(&config).context("failed to build application state")?;
    let app = build_router(state);

    let addr: SocketAddr = config
        .server
        .addr
        .parse()
        .with_context(|| format!("invalid listen address: {}", config.server.addr))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("msme listening on http://{addr}");
    info!("chat logs stored at {}", config.chatlog.path);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
