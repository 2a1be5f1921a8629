//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define scraper metrics (requests, latency, fetch outcomes, fragments)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `scraper_requests_total` (counter): API requests by route, status
//! - `scraper_request_duration_seconds` (histogram): API latency by route
//! - `scraper_fetch_total` (counter): fetches by mode, outcome
//! - `scraper_fetch_duration_seconds` (histogram): fetch latency by mode
//! - `scraper_fragments_total` (counter): fragments returned by winning strategy
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay low-cardinality (no URLs)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::fetch::FetchMode;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!("scraper_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("scraper_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fetch(mode: FetchMode, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("scraper_fetch_total", "mode" => mode.as_str(), "outcome" => outcome).increment(1);
    histogram!("scraper_fetch_duration_seconds", "mode" => mode.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fragments(strategy: &'static str, count: usize) {
    counter!("scraper_fragments_total", "strategy" => strategy).increment(count as u64);
}
