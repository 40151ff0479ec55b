//! External system integrations.
//!
//! - [`atlas`] - MongoDB Atlas Admin API client
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. Resources depend on the
//! [`atlas::AtlasApi`] trait, never on the HTTP client directly.
//!
//! ```rust,no_run
//! use mongodbatlas::adapters::atlas::{AtlasApi, AtlasClient};
//! use mongodbatlas::config::ProviderConfig;
//! use std::sync::Arc;
//!
//! # fn example() -> mongodbatlas::domain::Result<()> {
//! let config = ProviderConfig::from_env()?;
//! let api: Arc<dyn AtlasApi> = Arc::new(AtlasClient::new(&config.atlas)?);
//! # Ok(())
//! # }
//! ```

pub mod atlas;
