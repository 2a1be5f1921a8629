//! API handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use std::time::Instant;

use crate::extraction::{ExtractionError, ValidationError};
use crate::fetch::FetchMode;
use crate::http::request::{request_id, ScrapeRequest};
use crate::http::response::{ApiError, ScrapeResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// Health check with usage hints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "running",
        "message": "Moovit scraper API is up and running.",
        "version": env!("CARGO_PKG_VERSION"),
        "usage": {
            "endpoint": "/scrape",
            "method": "POST",
            "body": { "url": "https://moovitapp.com/url/to/scrape" },
            "rendered_endpoint": "/scrape/rendered"
        }
    }))
}

/// `POST /scrape`: direct HTTP fetch.
pub async fn scrape(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    handle(state, headers, payload, FetchMode::Http, "/scrape").await
}

/// `POST /scrape/rendered`: fetch through the rendering agent.
pub async fn scrape_rendered(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    handle(state, headers, payload, FetchMode::Rendered, "/scrape/rendered").await
}

async fn handle(
    state: AppState,
    headers: HeaderMap,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
    mode: FetchMode,
    route: &'static str,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let result = match payload {
        Ok(Json(ScrapeRequest { url: Some(url) })) => {
            tracing::info!(request_id = %request_id, url = %url, mode = %mode, "Scrape requested");
            let limit = state.request_timeout;
            match with_deadline(limit, state.extractor.extract(&url, mode)).await {
                Ok(result) => result.map_err(ApiError::from),
                Err(_) => Err(ApiError::from(ExtractionError::Deadline(limit.as_secs()))),
            }
        }
        Ok(Json(ScrapeRequest { url: None })) => Err(ApiError::from(ValidationError::Missing)),
        Err(rejection) => {
            tracing::debug!(request_id = %request_id, error = %rejection, "Unreadable request body");
            Err(ApiError::from(ValidationError::Missing))
        }
    };

    match result {
        Ok(routes) => {
            metrics::record_request(route, 200, start);
            Ok(Json(ScrapeResponse { routes }))
        }
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, error = %err.0, "Scrape failed");
            } else {
                tracing::warn!(request_id = %request_id, error = %err.0, "Scrape rejected");
            }
            metrics::record_request(route, status.as_u16(), start);
            Err(err)
        }
    }
}
