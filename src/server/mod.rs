//! HTTP Server module - REST API server implementation.
//!
//! This module provides the HTTP server for the loghub controller, including
//! routing, request handling, and response formatting.

pub mod handlers;
pub mod response;
pub mod state;


use crate::config::Config;
use crate::error::{LoghubError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Creates the API router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/status", get(handlers::status))
        // Logging configuration endpoints
        .route("/api/v1/logging/config", post(handlers::configure))
        .route("/api/v1/logging/projects", get(handlers::list_projects))
        .route("/api/v1/logging/projects/:id", get(handlers::get_project))
        .route(
            "/api/v1/logging/projects/:id/start",
            post(handlers::start_project),
        )
        // Agent registration
        .route("/api/v1/agents", post(handlers::register_agent))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Stored assignments are resumed before the listener accepts requests.
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::new(config)?);
    state.controller.resume().await?;

    let router = create_router(state);

    let addr = SocketAddr::new(
        config
            .server
            .bind
            .parse()
            .map_err(|e| LoghubError::config(format!("Invalid bind address: {}", e)))?,
        config.server.port,
    );

    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        LoghubError::connection_with_source(addr.to_string(), e)
    })?;

    axum::serve(listener, router)
        .await
        .map_err(|e| LoghubError::connection_with_source(addr.to_string(), e))?;

    Ok(())
}
