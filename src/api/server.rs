//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use crate::history::HistoryStore;
use crate::narration::Synthesizer;
use crate::repurpose::ContentRepurposer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repurposer: Arc<ContentRepurposer>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub history: Arc<HistoryStore>,
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState, port: u16) -> Result<()> {
    // Allow browser clients to reach the API directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/repurpose", post(handlers::repurpose))
        .route("/api/tts", post(handlers::tts))
        .route("/api/history", get(handlers::history_list))
        .route(
            "/api/history/:id",
            get(handlers::history_get).delete(handlers::history_delete),
        )
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
