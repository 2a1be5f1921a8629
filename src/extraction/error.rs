//! Extraction error kinds.

use thiserror::Error;

use crate::extraction::request::ValidationError;
use crate::fetch::{FetchError, RenderError};

/// Every failure that can leave the extraction pipeline.
///
/// An empty fragment set is not an error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Bad target URL, rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport, timeout or non-2xx failure.
    #[error(transparent)]
    Fetch(FetchError),

    /// The rendering agent failed or is unavailable.
    #[error(transparent)]
    Render(RenderError),

    /// The whole request outlived its deadline.
    #[error("request did not complete within {0} seconds")]
    Deadline(u64),
}

impl ExtractionError {
    /// Whether the caller is at fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, ExtractionError::Validation(_))
    }
}

impl From<FetchError> for ExtractionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Render(e) => ExtractionError::Render(e),
            other => ExtractionError::Fetch(other),
        }
    }
}

impl From<RenderError> for ExtractionError {
    fn from(err: RenderError) -> Self {
        ExtractionError::Render(err)
    }
}

/// Failure to assemble the pipeline from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}
