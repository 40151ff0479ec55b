//! Configuration schema types
//!
//! Maps the provider's TOML file. Every section has defaults so an empty
//! file (or no file at all, see [`ProviderConfig::from_env`]) is usable once
//! credentials are supplied.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Default Atlas endpoint
pub const DEFAULT_BASE_URL: &str = "https://cloud.mongodb.com/";

/// Root provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Atlas API connection and credentials
    #[serde(default)]
    pub atlas: AtlasConnectionConfig,

    /// Scaling of wait delays and intervals
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProviderConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.atlas.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for transport failures and retried reads/deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries of a request that failed to connect
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "atlas.retry.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }

        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "atlas.retry.initial_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }

        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(format!(
                "atlas.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Atlas API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConnectionConfig {
    /// Base URL of the Atlas API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Programmatic API public key
    #[serde(default)]
    pub public_key: Option<String>,

    /// Programmatic API private key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub private_key: Option<SecretString>,

    /// Service-account access token, used instead of the key pair when set
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AtlasConnectionConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("atlas.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("atlas.base_url must start with http:// or https://".to_string());
        }

        let has_token = self
            .access_token
            .as_ref()
            .map(|t| !t.expose_secret().is_empty())
            .unwrap_or(false);

        if !has_token {
            if self.public_key.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
                return Err(
                    "atlas.public_key cannot be empty when no access_token is configured"
                        .to_string(),
                );
            }

            if self
                .private_key
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "atlas.private_key cannot be empty when no access_token is configured"
                        .to_string(),
                );
            }
        }

        if self.timeout_seconds == 0 {
            return Err("atlas.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for AtlasConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            public_key: None,
            private_key: None,
            access_token: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

const MAX_INTERVAL_SCALE: f64 = 1000.0;

/// Polling configuration
///
/// Resource waits use fixed per-resource delays and intervals (a cluster is
/// first checked after three minutes, then every minute). These settings
/// scale them; timeouts are never scaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Multiplier applied to every delay and poll interval
    #[serde(default = "default_interval_scale")]
    pub interval_scale: f64,

    /// Upper bound for a single poll interval, in seconds
    #[serde(default)]
    pub max_interval_seconds: Option<u64>,
}

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.interval_scale.is_finite() || self.interval_scale < 0.0 {
            return Err(format!(
                "polling.interval_scale must be a non-negative number, got {}",
                self.interval_scale
            ));
        }
        if self.interval_scale > MAX_INTERVAL_SCALE {
            return Err(format!(
                "polling.interval_scale must be <= {MAX_INTERVAL_SCALE}, got {}",
                self.interval_scale
            ));
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_scale: default_interval_scale(),
            max_interval_seconds: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_interval_scale() -> f64 {
    1.0
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn key_pair_config() -> AtlasConnectionConfig {
        AtlasConnectionConfig {
            public_key: Some("public".to_string()),
            private_key: Some(secret_string("private".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_atlas_config_requires_credentials() {
        let config = AtlasConnectionConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.contains("public_key"));

        let config = AtlasConnectionConfig {
            public_key: Some("public".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("private_key"));

        assert!(key_pair_config().validate().is_ok());
    }

    #[test]
    fn test_access_token_replaces_key_pair() {
        let config = AtlasConnectionConfig {
            access_token: Some(secret_string("token".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_atlas_config_base_url_scheme() {
        let mut config = key_pair_config();
        config.base_url = "cloud.mongodb.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        assert!(config.validate().is_ok());

        config.max_retries = 11;
        assert!(config.validate().is_err());

        config = RetryConfig {
            initial_delay_ms: 5000,
            max_delay_ms: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = RetryConfig {
            backoff_multiplier: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_polling_config_validation() {
        let mut config = PollingConfig::default();
        assert!(config.validate().is_ok());

        config.interval_scale = 0.0;
        assert!(config.validate().is_ok());

        config.interval_scale = -1.0;
        assert!(config.validate().is_err());

        config.interval_scale = f64::NAN;
        assert!(config.validate().is_err());

        config.interval_scale = 1000.0;
        assert!(config.validate().is_ok());

        config.interval_scale = 1e20;
        assert!(config.validate().unwrap_err().contains("<= 1000"));
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ProviderConfig = toml::from_str("").unwrap();
        assert_eq!(config.atlas.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.polling.interval_scale, 1.0);
        assert!(!config.logging.local_enabled);
    }
}
