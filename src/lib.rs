//! Moovit route scraper library.
//!
//! Fetches a transit-route page (directly or through a headless browser)
//! and extracts the HTML fragments of its `route-inner` elements.

pub mod config;
pub mod extraction;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ScraperConfig;
pub use extraction::{Extractor, Fragment, FragmentMatcher, FragmentSet};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
