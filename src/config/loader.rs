//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ProviderConfig;
use super::secret::secret_string;
use crate::domain::errors::ProviderError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Environment variable holding the API public key
pub const ENV_PUBLIC_KEY: &str = "MONGODB_ATLAS_PUBLIC_KEY";
/// Environment variable holding the API private key
pub const ENV_PRIVATE_KEY: &str = "MONGODB_ATLAS_PRIVATE_KEY";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "MONGODB_ATLAS_BASE_URL";
/// Environment variable holding a service-account access token
pub const ENV_ACCESS_TOKEN: &str = "MONGODB_ATLAS_ACCESS_TOKEN";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "MONGODB_ATLAS_LOG_LEVEL";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ProviderConfig
/// 4. Applies environment variable overrides (MONGODB_ATLAS_* variables)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use mongodbatlas::config::loader::load_config;
///
/// let config = load_config("mongodbatlas.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ProviderConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ProviderError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ProviderError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ProviderConfig = toml::from_str(&contents)
        .map_err(|e| ProviderError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate(&config)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

impl ProviderConfig {
    /// Builds a configuration from defaults and `MONGODB_ATLAS_*` variables
    /// only, for running without a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid, typically
    /// because no credentials are set.
    pub fn from_env() -> Result<Self> {
        let mut config = ProviderConfig::default();
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &ProviderConfig) -> Result<()> {
    config.validate().map_err(|e| {
        ProviderError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| {
        ProviderError::Configuration(format!("Invalid substitution pattern: {}", e))
    })?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ProviderError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies `MONGODB_ATLAS_*` overrides, looked up through `lookup`
///
/// Empty values are ignored.
fn apply_env_overrides<F>(config: &mut ProviderConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(val) = get(ENV_PUBLIC_KEY) {
        config.atlas.public_key = Some(val);
    }
    if let Some(val) = get(ENV_PRIVATE_KEY) {
        config.atlas.private_key = Some(secret_string(val));
    }
    if let Some(val) = get(ENV_ACCESS_TOKEN) {
        config.atlas.access_token = Some(secret_string(val));
    }
    if let Some(val) = get(ENV_BASE_URL) {
        config.atlas.base_url = val;
    }
    if let Some(val) = get(ENV_LOG_LEVEL) {
        config.application.log_level = val.to_lowercase();
    }
}
