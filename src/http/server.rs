//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, tracing, timeout, body limit, request ID)
//! - Bind server to listener
//! - Stop accepting on shutdown signal and drain in-flight requests

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::config::ScraperConfig;
use crate::extraction::{Extractor, SetupError};
use crate::http::handlers::{index, scrape, scrape_rendered};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Headroom of the timeout layer over the handler deadline.
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    /// Deadline for one extraction, enforced inside the handler.
    pub request_timeout: Duration,
}

/// HTTP server for the scraper API.
pub struct HttpServer {
    router: Router,
    config: ScraperConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the production extraction pipeline.
    pub fn new(config: ScraperConfig) -> Result<Self, SetupError> {
        let extractor = Extractor::from_config(&config)?;
        tracing::debug!(extractor = ?extractor, "Extraction pipeline ready");
        Ok(Self::with_extractor(config, Arc::new(extractor)))
    }

    /// Create a server around an existing extractor.
    pub fn with_extractor(config: ScraperConfig, extractor: Arc<Extractor>) -> Self {
        let state = AppState {
            extractor,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &ScraperConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/scrape", post(scrape))
            .route("/scrape/rendered", post(scrape_rendered))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                Duration::from_secs(config.timeouts.request_secs) + RESPONSE_GRACE,
            ))
            .layer(CorsLayer::permissive())
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }
}
