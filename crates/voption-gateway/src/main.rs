/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Running HTTP gateway with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use voption_gateway::{AppState, GatewayConfig, run_server};

#[derive(Parser, Debug)]
#[command(name = "voption-gateway", version, about = "Options exchange HTTP gateway")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting voption-gateway"
    );

    let mut config = load_config(&args.config_path)?;
    config.apply_env_overrides();
    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.exchange.base_url,
        credentials = config.exchange.has_credentials(),
        "configuration loaded"
    );

    let rest = config.exchange.build_client()?;

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    if let Some(interval) = config.time_sync_interval() {
        if let Err(err) = rest.start_time_sync(interval).await {
            warn!(error = %err, "initial drift calculation failed; periodic sync continues");
        }
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    run_server(&config.listen_addr, AppState::new(rest.clone()), shutdown)
        .await
        .context("run gateway")?;
    info!("shutdown signal received");

    rest.end_time_sync().await;
    info!("gateway shutdown complete");

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<GatewayConfig> {
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    GatewayConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
