//! Editor Bridge - Entry Point
//!
//! CLI for sending commands to the editor and monitoring the connection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use editor_bridge::{Config, ConnectionManager, Params, VERSION};

/// Editor Bridge - drive the editor over its JSON command socket
#[derive(Parser)]
#[command(name = "editor-bridge")]
#[command(version = VERSION)]
#[command(about = "Send commands to the editor over its JSON command socket")]
struct Cli {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the editor host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Override the editor port
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the editor answers a liveness check
    Ping,
    /// Send one command and print its result
    Send {
        /// Command type, e.g. manage_scene
        command_type: String,
        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
    /// Print the state of a verified connection
    Status,
    /// Keep checking the connection until interrupted
    Watch {
        /// Seconds between liveness checks
        #[arg(short, long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    editor_bridge::util::init_tracing(&config.logging)?;

    let manager = ConnectionManager::new(config.editor.clone());

    let outcome = match cli.command {
        Commands::Ping => ping(&manager).await,
        Commands::Send {
            command_type,
            params,
        } => send(&manager, &command_type, &params).await,
        Commands::Status => status(&manager).await,
        Commands::Watch { interval } => watch(manager.clone(), &config, interval).await,
    };

    manager.shutdown().await;
    outcome
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };

    if let Some(host) = &cli.host {
        config.editor.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.editor.port = port;
    }
    config.validate()?;

    Ok(config)
}

async fn ping(manager: &ConnectionManager) -> Result<()> {
    let report = manager.test_connection().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        anyhow::bail!("editor did not answer the liveness check");
    }
    Ok(())
}

async fn send(manager: &ConnectionManager, command_type: &str, raw_params: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(raw_params).context("--params is not valid JSON")?;
    let params = Params::try_from(value)?;

    let result = manager.exchange(command_type, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn status(manager: &ConnectionManager) -> Result<()> {
    let lease = manager.acquire().await?;
    let info = lease
        .info()
        .context("connection was released before its status was read")?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn watch(manager: Arc<ConnectionManager>, config: &Config, interval_secs: u64) -> Result<()> {
    if config.metrics.enabled {
        editor_bridge::metrics::init_metrics(&config.metrics)?;
        info!(bind_addr = %config.metrics.bind_addr, "Metrics endpoint started");
    }

    info!(
        version = VERSION,
        endpoint = %manager.endpoint(),
        interval_secs,
        "Watching editor connection"
    );
    manager.startup().await;

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.tick().await;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // acquire() pings an existing connection and rebuilds it on failure
                match manager.acquire().await {
                    Ok(lease) => {
                        if let Some(info) = lease.info() {
                            info!(
                                conn_id = %info.id,
                                exchanges = info.exchanges,
                                uptime_secs = info.uptime_secs,
                                "Editor connection healthy"
                            );
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Editor unavailable, retrying next interval");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
