//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Fetch of a target page:
//!     → timeouts.rs (bound launch, navigation, settle and body reads)
//!     → On expiry: typed timeout error, resources released by the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: one attempt per extraction, callers retry if they want

pub mod timeouts;
