//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, resolve base directory)
//!     → validation.rs (semantic checks)
//!     → IndexConfig (validated, immutable)
//!     → routing::RouteTable built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields except route `source`/`to` have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any error is fatal at startup, never deferred to request time

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, LoadedConfig};
pub use schema::IndexConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::RouteSource;
pub use schema::ServerConfig;
pub use schema::UpstreamConfig;
pub use validation::ValidationError;
