//! barrier-engine: advisory signal monitor for short-lived up/down markets.
//!
//! Usage:
//!   barrier-engine [OPTIONS]
//!
//! Options:
//!   -a, --asset <ASSET>       Asset to monitor: btc, eth, sol, xrp
//!   -c, --config <FILE>       Config file path (default: config/engine.toml)
//!   -w, --window <DURATION>   Market window duration: 5m, 15m, 1h
//!   --log-level <LEVEL>       Log level override

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use barrier_common::{CryptoAsset, WindowDuration};
use barrier_engine::config::EngineConfig;
use barrier_engine::runner;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "barrier-engine")]
#[command(about = "Advisory barrier-evaluation monitor for 15-minute up/down markets")]
#[command(version)]
struct Args {
    /// Asset to monitor: btc, eth, sol, xrp
    #[arg(short, long)]
    asset: Option<CryptoAsset>,

    /// Config file path
    #[arg(short, long, default_value = "config/engine.toml")]
    config: PathBuf,

    /// Market window duration: 5m, 15m, 1h
    #[arg(short, long)]
    window: Option<WindowDuration>,

    /// Log level override: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let args = Args::parse();

    let mut config = if args.config.exists() {
        EngineConfig::from_file(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        warn!("Config file not found at {:?}, using defaults", args.config);
        EngineConfig::default()
    };

    config.apply_env_overrides()?;
    config.apply_cli_overrides(args.asset, args.window, args.log_level);

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    info!("Starting barrier-engine monitor");
    info!("Asset: {}", config.asset);
    info!("Window duration: {}", config.window_duration);
    info!(
        "Execution window: {}-{} minutes before settlement",
        config.window.entry_min_minutes, config.window.entry_max_minutes
    );

    config.validate().context("Configuration validation failed")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            error!("Shutdown signal handler error: {}", e);
        }
        info!("Requesting shutdown...");
        let _ = shutdown_tx.send(true);
    });

    runner::run_monitor(config, shutdown_rx).await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
