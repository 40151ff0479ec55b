//! CLI command implementations

pub mod resource;
pub mod state_id;
pub mod validate;

use crate::config::{load_config, ProviderConfig};
use std::path::Path;

/// Loads the configuration file, or builds the configuration from the
/// environment when the file does not exist
pub(crate) fn load_provider_config(config_path: &str) -> anyhow::Result<ProviderConfig> {
    if Path::new(config_path).exists() {
        Ok(load_config(config_path)?)
    } else {
        tracing::debug!(config_path = %config_path, "Config file not found, using environment");
        Ok(ProviderConfig::from_env()?)
    }
}
