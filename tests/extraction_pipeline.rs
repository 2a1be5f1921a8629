//! End-to-end extraction over real HTTP against a mock upstream.

use std::sync::Arc;
use std::time::Duration;

use route_scraper::extraction::{ExtractionError, Extractor};
use route_scraper::fetch::{FetchError, FetchMode};

mod common;

fn extractor(config: &route_scraper::ScraperConfig) -> Extractor {
    Extractor::from_config(config).expect("pipeline should build")
}

#[tokio::test]
async fn test_simple_route_page() {
    let addr = common::start_html_backend(
        r#"<html><body><div class="route-inner"><span>X</span></div></body></html>"#,
    )
    .await;

    let routes = extractor(&common::local_config())
        .extract(&format!("http://{addr}/tripplan"), FetchMode::Http)
        .await
        .unwrap();

    assert_eq!(
        routes.into_strings(),
        vec![r#"<div class="route-inner"><span>X</span></div>"#.to_string()]
    );
}

#[tokio::test]
async fn test_nested_routes_fall_back_to_balanced_scan() {
    let addr = common::start_html_backend(concat!(
        "<html><body><main>",
        "<div class='route-inner'><div class='leg'><div>Bus 480</div></div><div>12 min</div></div>",
        "<div class='route-inner'><div class='leg'>Walk</div></div>",
        "<div class='route-inner'><div class='leg'>Walk</div></div>",
        "</main></body></html>",
    ))
    .await;

    let routes = extractor(&common::local_config())
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap()
        .into_strings();

    assert_eq!(routes.len(), 2, "duplicates should collapse: {routes:?}");
    assert!(routes[0].ends_with("<div>12 min</div></div>"));
    for route in &routes {
        assert_eq!(route.matches("<div").count(), route.matches("</div>").count());
    }
}

#[tokio::test]
async fn test_page_without_marker_is_empty() {
    let addr = common::start_html_backend("<html><body><h1>Are you a robot?</h1></body></html>").await;

    let routes = extractor(&common::local_config())
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn test_upstream_503_is_fetch_error() {
    let addr = common::start_programmable_backend(|| async { (503, "Service Unavailable".into()) }).await;

    let err = extractor(&common::local_config())
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ExtractionError::Fetch(FetchError::Status { status: 503, .. })),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let addr = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "<div class=\"route-inner\">late</div>".into())
    })
    .await;

    let mut config = common::local_config();
    config.fetch.timeout_secs = 1;

    let err = extractor(&config)
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Fetch(FetchError::Timeout(1))), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let addr = common::closed_address().await;

    let err = extractor(&common::local_config())
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Fetch(FetchError::Transport(_))), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_degraded_deployment_returns_empty_on_failure() {
    let addr = common::start_programmable_backend(|| async { (500, "boom".into()) }).await;

    let mut config = common::local_config();
    config.fetch.degrade_to_empty = true;

    let routes = extractor(&config)
        .extract(&format!("http://{addr}/"), FetchMode::Http)
        .await
        .unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn test_sends_browser_like_headers() {
    let (addr, mut requests) =
        common::start_capturing_backend(|| async { (200, "<html></html>".into()) }).await;

    extractor(&common::local_config())
        .extract(&format!("http://{addr}/route"), FetchMode::Http)
        .await
        .unwrap();

    let head = requests.recv().await.unwrap().to_lowercase();
    assert!(head.starts_with("get /route http/1.1"));
    assert!(head.contains("user-agent: mozilla/5.0"));
    assert!(head.contains("chrome/133.0.0.0"));
    assert!(head.contains("accept: text/html"));
    assert!(head.contains("accept-language: en-us"));
}

#[tokio::test]
async fn test_concurrent_extractions_are_independent() {
    let a = common::start_html_backend(r#"<div class="route-inner">A</div>"#).await;
    let b = common::start_html_backend(r#"<div class="route-inner">B</div>"#).await;
    let ex = Arc::new(extractor(&common::local_config()));
    let url_a = format!("http://{a}/");
    let url_b = format!("http://{b}/");

    let (ra, rb) = tokio::join!(
        ex.extract(&url_a, FetchMode::Http),
        ex.extract(&url_b, FetchMode::Http),
    );
    assert_eq!(ra.unwrap().into_strings(), vec![r#"<div class="route-inner">A</div>"#]);
    assert_eq!(rb.unwrap().into_strings(), vec![r#"<div class="route-inner">B</div>"#]);
}
