// MongoDB Atlas Provider - Atlas control-plane resources
// Copyright (c) 2025 MongoDB Atlas Provider Contributors
// Licensed under the Mozilla Public License 2.0

//! # MongoDB Atlas provider core
//!
//! Resource logic behind a Terraform provider for MongoDB Atlas: it turns
//! declarative resource configuration into Atlas REST calls, waits for the
//! asynchronous work Atlas performs behind them and keeps the result in
//! Terraform state.
//!
//! ## Architecture
//!
//! - [`domain`] - Composite state IDs, import ID parsing, errors
//! - [`core`] - Async-completion poller and retry primitive
//! - [`adapters`] - Atlas Admin API client
//! - [`resources`] - Project, cluster, access list, snapshot, restore job and LDAP resources
//! - [`provider`] - Dispatch by Terraform type name
//! - [`config`] - Configuration loading
//! - [`logging`] - Structured logging
//! - [`cli`] - Operator command line
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mongodbatlas::config::ProviderConfig;
//! use mongodbatlas::provider::Provider;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::from_env()?;
//!     let provider = Provider::new(&config)?;
//!
//!     let state = provider
//!         .create(
//!             "mongodbatlas_cluster",
//!             json!({
//!                 "project_id": "5d0f1f73cf09a29120e173cf",
//!                 "name": "Cluster0",
//!                 "provider_name": "AWS",
//!                 "provider_instance_size_name": "M10",
//!                 "provider_region_name": "US_EAST_1"
//!             }),
//!         )
//!         .await?;
//!
//!     println!("{}", state["id"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`]. At the plugin boundary an
//! error becomes one [`domain::Diagnostic`]:
//!
//! ```rust
//! use mongodbatlas::domain::ProviderError;
//!
//! let err = ProviderError::ImportFormat("use {project_id}-{name}".to_string());
//! let diagnostic = err.to_diagnostic();
//! assert!(diagnostic.summary.contains("{project_id}-{name}"));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod provider;
pub mod resources;
