//! REST API for the content repurposing engine.
//!
//! Exposes the generation flows, narration synthesis and history over HTTP
//! for web clients.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::AppState;

/// API server handling REST requests
pub struct ApiServer {
    state: AppState,
    port: u16,
}

impl ApiServer {
    pub fn new(
        repurposer: Arc<crate::repurpose::ContentRepurposer>,
        synthesizer: Arc<dyn crate::narration::Synthesizer>,
        history: Arc<crate::history::HistoryStore>,
        port: u16,
    ) -> Self {
        Self {
            state: AppState {
                repurposer,
                synthesizer,
                history,
            },
            port,
        }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);
        server::start_http_server(self.state, self.port).await
    }
}
