//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, every error collected)
//!     → RouterConfig (validated, immutable)
//!     → RouterOptions::from_config (compiled into router options)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Hooks cannot be expressed in a file; they are attached in code

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LogFormat, ModeKind, ObservabilityConfig, RenderConfig, RouteTable, RouterConfig};
pub use validation::{validate_config, ValidationError};
