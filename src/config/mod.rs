//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → config file (TOML, optional) via loader.rs
//!     → environment overrides (ERROR_RATE_THRESHOLD, WINDOW_SIZE, ...)
//!     → validation.rs (semantic checks)
//!     → WatcherConfig (validated, immutable)
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → command-line overrides re-applied
//!     → atomic swap of Arc<AlertSettings>
//!     → dispatcher and evaluator observe new settings on the next line
//! ```
//!
//! # Design Decisions
//! - Only alert settings are reloadable; window capacity is fixed at startup
//! - All fields have defaults to allow running with no config at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, ConfigOverrides};
pub use schema::{
    AlertSettings, AlertingConfig, DetectionConfig, LogFormat, NotifierConfig,
    ObservabilityConfig, SourceConfig, SourceKind, WatcherConfig,
};
pub use watcher::{SharedSettings, UpdateOutcome};
