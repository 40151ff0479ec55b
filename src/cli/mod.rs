//! CLI interface and argument parsing
//!
//! The binary is a thin operator tool around the library: it validates
//! configuration, encodes and decodes state IDs and runs single resource
//! operations against Atlas.

pub mod commands;

use clap::{Parser, Subcommand};

/// MongoDB Atlas provider tooling
#[derive(Parser, Debug)]
#[command(name = "mongodbatlas")]
#[command(version, about, long_about = None)]
#[command(author = "MongoDB Atlas Provider Contributors")]
pub struct Cli {
    /// Path to configuration file; environment variables are used when it does not exist
    #[arg(short, long, default_value = "mongodbatlas.toml", env = "MONGODB_ATLAS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MONGODB_ATLAS_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Encode or decode composite resource IDs
    StateId(commands::state_id::StateIdArgs),

    /// Run one lifecycle operation of a resource
    Resource(commands::resource::ResourceArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["mongodbatlas", "validate-config"]);
        assert_eq!(cli.config, "mongodbatlas.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "mongodbatlas",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "validate-config",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_state_id_encode() {
        let cli = Cli::parse_from([
            "mongodbatlas",
            "state-id",
            "encode",
            "project_id=p1",
            "cluster_name=c1",
        ]);
        assert!(matches!(cli.command, Commands::StateId(_)));
    }

    #[test]
    fn test_cli_parse_resource_import() {
        let cli = Cli::parse_from([
            "mongodbatlas",
            "resource",
            "import",
            "mongodbatlas_cluster",
            "--id",
            "5d0f1f73cf09a29120e173cf-Cluster0",
        ]);
        let Commands::Resource(args) = cli.command else {
            panic!("expected resource command");
        };
        assert_eq!(args.type_name, "mongodbatlas_cluster");
        assert_eq!(args.id.as_deref(), Some("5d0f1f73cf09a29120e173cf-Cluster0"));
    }
}
