//! Response shapes and error mapping.
//!
//! # Responsibilities
//! - Serialize successful extractions as `{"routes": [...]}`
//! - Map extraction errors to HTTP status codes with `{"error": message}`
//!
//! # Design Decisions
//! - Validation errors are 400, everything else is 500
//! - Messages are the error's display text; no internals beyond that

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::extraction::{ExtractionError, FragmentSet};

/// Successful scrape.
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub routes: FragmentSet,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned from API handlers.
#[derive(Debug)]
pub struct ApiError(pub ExtractionError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<ExtractionError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
