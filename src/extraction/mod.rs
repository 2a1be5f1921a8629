//! Route fragment extraction subsystem.
//!
//! # Data Flow
//! ```text
//! raw URL
//!     → request.rs      (validate scheme + host, no I/O)
//!     → orchestrator.rs (pick fetcher, fetch once)
//!     → matcher.rs      (strategy cascade, first non-empty wins)
//!         └─ balanced.rs (depth-counted fallback)
//!     → fragment.rs     (order-preserving dedupe)
//!     → FragmentSet
//! ```
//!
//! # Design Decisions
//! - Matching is synchronous and runs to completion once started
//! - No state is shared between extractions
//! - Empty results are successes

pub mod balanced;
pub mod error;
pub mod fragment;
pub mod matcher;
pub mod orchestrator;
pub mod request;

pub use error::{ExtractionError, SetupError};
pub use fragment::{Fragment, FragmentSet};
pub use matcher::{FragmentMatcher, FragmentStrategy, MatchInput, MatchOutcome, DEFAULT_MARKER};
pub use orchestrator::Extractor;
pub use request::{ExtractionRequest, ValidationError};
