//! Logging
//!
//! Structured logging through `tracing`:
//! - human-readable console output on stderr, filtered by level or `RUST_LOG`
//! - optional JSON log files with daily, hourly or no rotation
//!
//! Terraform reads the plugin's stdout, so nothing is ever logged there.
//!
//! # Example
//!
//! ```no_run
//! use mongodbatlas::logging::init_logging;
//! use mongodbatlas::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(cluster_name = "Cluster0", "Waiting for cluster");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};
