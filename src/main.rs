#![forbid(unsafe_code)]

//! Slack webhook server binary for `mention-tasks`.
//!
//! Bootstraps configuration and credentials, connects the Slack Web API
//! client, and serves the Events API webhook until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use mention_tasks::config::GlobalConfig;
use mention_tasks::slack::client::SlackService;
use mention_tasks::slack::webhook;
use mention_tasks::state::AppState;
use mention_tasks::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "mention-tasks", about = "Slack mention-to-task webhook server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured HTTP port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("mention-tasks server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    config.load_credentials().await?;

    let config = Arc::new(config);
    info!(
        allowed = config.allowed_user_ids.len(),
        history_limit = config.history_limit,
        "configuration loaded"
    );

    // ── Build shared application state ──────────────────
    let slack = SlackService::new(&config.slack).map_err(|err| {
        error!(%err, "slack client start failed");
        err
    })?;
    let state = Arc::new(AppState::new(Arc::clone(&config), Arc::new(slack)));

    // ── Serve webhook ───────────────────────────────────
    let listener = webhook::bind(&config).await?;
    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server = tokio::spawn(async move { webhook::serve(state, listener, server_ct).await });

    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    match server.await {
        Ok(result) => result?,
        Err(err) => error!(%err, "webhook task panicked"),
    }
    info!("mention-tasks shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
