//! `validate-config` command

use super::load_provider_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        let config = match load_provider_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(()) => {
                let auth = if config.atlas.access_token.is_some() {
                    "access token"
                } else {
                    "API key pair"
                };

                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Atlas Base URL: {}", config.atlas.base_url);
                println!("  Authentication: {auth}");
                if let Some(public_key) = &config.atlas.public_key {
                    println!("  Public Key: {public_key}");
                }
                println!("  Request Timeout: {}s", config.atlas.timeout_seconds);
                println!("  Max Retries: {}", config.atlas.retry.max_retries);
                println!("  Poll Interval Scale: {}", config.polling.interval_scale);
                println!("  Log Level: {}", config.application.log_level);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
