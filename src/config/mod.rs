//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, PORT / CHROME_BIN overrides)
//!     → validation.rs (semantic checks)
//!     → ScraperConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, parse_config, ConfigError};
pub use schema::{
    FetchConfig, ListenerConfig, ObservabilityConfig, RenderConfig, ScraperConfig, TargetConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ConfigIssue};
