//! # HTTP Server
//!
//! Combines the ark and health routers behind permissive CORS and
//! request tracing.

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::ArkStore;

use super::ark_routes::{ark_routes, ArkState};
use super::config::HttpServerConfig;
use super::observability_routes::health_routes;

/// HTTP server for the ark browser
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over `store` with default configuration
    pub fn new(store: Arc<dyn ArkStore>) -> Self {
        Self::with_config(HttpServerConfig::default(), store)
    }

    /// Create a server over `store` with custom configuration
    pub fn with_config(config: HttpServerConfig, store: Arc<dyn ArkStore>) -> Self {
        let router = Self::build_router(store);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(store: Arc<dyn ArkStore>) -> Router {
        let ark_state = Arc::new(ArkState::new(store));

        // Browsers on any origin may read the listing
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);

        Router::new()
            .merge(health_routes())
            .merge(ark_routes(ark_state))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        info!("Starting ark server on {}", listener.local_addr()?);
        info!("  GET /          - paginated listing");
        info!("  GET /download  - spreadsheet export");
        info!("  GET /health    - health check");

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
