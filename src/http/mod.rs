//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs   (Axum setup, middleware)
//!     → request.rs  (request ID, body shape)
//!     → handlers.rs (dispatch to the extractor)
//!     → response.rs (routes JSON or error JSON + status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ScrapeRequest, X_REQUEST_ID};
pub use response::{ApiError, ScrapeResponse};
pub use server::{AppState, HttpServer};
