//! Request handling.
//!
//! # Responsibilities
//! - Define the scrape request body
//! - Generate a request ID for every request and echo it on the response
//! - Read the request ID back for log correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, not replaced
//! - `url` is optional at the serde level so a missing field is a
//!   validation error (400), not a deserialization error

use axum::http::{HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Body of `POST /scrape` and `POST /scrape/rendered`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Layer that assigns a UUID v4 request ID when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Request ID for logging, `"unknown"` if absent.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_url_deserializes() {
        let req: ScrapeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_none());
        let req: ScrapeRequest = serde_json::from_str(r#"{"url":"https://moovitapp.com"}"#).unwrap();
        assert_eq!(req.url.as_deref(), Some("https://moovitapp.com"));
    }

    #[test]
    fn test_request_id_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
