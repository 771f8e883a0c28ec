//! AI Code Reviewer server - HTTP API in front of an upstream language model.
//!
//! This crate provides:
//! - `POST /api/review` and `POST /api/generate`, each forwarding one prompt
//!   to the configured upstream model
//! - Deterministic fallback text when the upstream is unconfigured,
//!   unreachable, or answers with an error status
//! - `GET /api/health`
//!
//! Upstream failures never surface as HTTP errors; only malformed requests
//! (400/413) and unexpected failures (500) do.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod prompts;
pub mod state;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use dispatcher::RequestDispatcher;
pub use error::{AppError, AppResult};
pub use state::AppState;
pub use upstream::{Fallback, FallbackReason, Mode, UpstreamClient, UpstreamResult};

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if !config.upstream.is_configured() {
        warn!("GROQ_API_URL or GROQ_API_KEY is not set.");
        warn!("Every request will be answered with placeholder text.");
    }

    let addr: SocketAddr = config.listen_addr.parse()?;
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("AI Code Reviewer server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .nest("/api", api::routes())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .with_state(state)
}
