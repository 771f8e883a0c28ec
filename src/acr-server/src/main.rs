//! AI Code Reviewer server binary.

use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use acr_server::{ServerConfig, run_with_shutdown};

/// AI Code Reviewer API server
#[derive(Parser)]
#[command(name = "acr-server")]
#[command(about = "HTTP API server forwarding code review and generation requests to GROQ")]
#[command(version)]
struct Args {
    /// Configuration file path (JSON); environment variables override it
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address (overrides PORT / ACR_LISTEN_ADDR)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is the normal case in production.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServerConfig::load(path).and_then(|mut config| {
            config.apply_env()?;
            Ok(config)
        }),
        None => ServerConfig::from_env(),
    };

    let level = args
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let json = args.json_logs
        || config
            .as_ref()
            .is_ok_and(|c| c.logging.format.eq_ignore_ascii_case("json"));
    setup_logging(&level, json);

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = match config {
        Ok(c) => c,
        Err(e) => {
            match &args.config {
                Some(path) => error!("Failed to load config from {}: {}", path, e),
                None => error!("Failed to load config from environment: {}", e),
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    info!("Starting AI Code Reviewer server on {}", config.listen_addr);
    info!("Press Ctrl+C to stop");

    let shutdown = shutdown_signal();

    if let Err(e) = run_with_shutdown(config, shutdown).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}
