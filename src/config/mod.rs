//! Configuration management for the provider.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The provider reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MONGODB_ATLAS_*` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mongodbatlas::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("mongodbatlas.toml")?;
//! println!("Atlas URL: {}", config.atlas.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`AtlasConnectionConfig`] - Endpoint, credentials, timeouts and retries
//! - [`PollingConfig`] - Scaling of wait delays and intervals
//! - [`LoggingConfig`] - Local JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [atlas]
//! public_key = "${MONGODB_ATLAS_PUBLIC_KEY}"
//! private_key = "${MONGODB_ATLAS_PRIVATE_KEY}"
//!
//! [atlas.retry]
//! max_retries = 3
//!
//! [polling]
//! interval_scale = 1.0
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AtlasConnectionConfig, LoggingConfig, PollingConfig, ProviderConfig,
    RetryConfig, DEFAULT_BASE_URL,
};
pub use secret::{secret_string, SecretString, SecretValue};
