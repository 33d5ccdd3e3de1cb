//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize, defaults for missing sections)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed by reference to identity, service and http
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults so the binary runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{executable_dir, load_config, load_or_default, ConfigError};
pub use schema::AppConfig;
pub use schema::IdentityConfig;
pub use schema::ListenerConfig;
pub use schema::LoggingConfig;
pub use schema::PathsConfig;
pub use schema::ResolvedPaths;
pub use schema::ServiceConfig;
