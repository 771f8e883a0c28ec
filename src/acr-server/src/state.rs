//! Application state management.

use crate::config::ServerConfig;
use crate::dispatcher::RequestDispatcher;
use crate::upstream::UpstreamClient;

/// Application state shared across request handlers.
///
/// Immutable after startup; handlers share it through an `Arc`.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Review/generation dispatcher.
    pub dispatcher: RequestDispatcher,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ServerConfig) -> Self {
        let dispatcher = RequestDispatcher::new(UpstreamClient::new(config.upstream.clone()));
        Self { config, dispatcher }
    }
}
