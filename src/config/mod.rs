//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from SERVERLESS_PROXY_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → consumed once by the cold-start builder
//! ```
//!
//! # Design Decisions
//! - Config is read once per process; the facade is frozen from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, parse_config, ConfigError};
pub use schema::{
    ApiGatewayConfig, DispatchConfig, FilterConfig, HeaderMergePolicy, LogFormat,
    ObservabilityConfig, ProxyConfig, RequestObjectConfig,
};
