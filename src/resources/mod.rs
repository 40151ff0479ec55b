//! Terraform resources and data sources backed by the Atlas API
//!
//! Each resource maps its configuration to typed request structs, calls
//! Atlas through [`AtlasApi`], waits for asynchronous work where Atlas needs
//! it, and flattens the answer back into a state object. Configuration and
//! state cross the plugin boundary as JSON objects.
//!
//! # Resources
//!
//! | Type name | Module |
//! |-----------|--------|
//! | `mongodbatlas_project` | [`project`] |
//! | `mongodbatlas_cluster` | [`cluster`] |
//! | `mongodbatlas_project_ip_access_list` | [`ip_access_list`] |
//! | `mongodbatlas_cloud_backup_snapshot` | [`cloud_backup_snapshot`] |
//! | `mongodbatlas_cloud_backup_snapshot_restore_job` | [`snapshot_restore_job`] |
//! | `mongodbatlas_ldap_verify` | [`ldap_verify`] |
//!
//! The project and cluster modules also provide data sources of the same
//! type names.

pub mod cloud_backup_snapshot;
pub mod cluster;
pub mod ip_access_list;
pub mod ldap_verify;
pub mod project;
pub mod snapshot_restore_job;
pub mod timeouts;

pub use timeouts::ResourceTimeouts;

use crate::adapters::atlas::AtlasApi;
use crate::core::poll::PollSettings;
use crate::domain::{ProviderError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Shared dependencies of every resource
#[derive(Clone)]
pub struct ResourceContext {
    pub api: Arc<dyn AtlasApi>,
    pub polling: PollSettings,
}

impl ResourceContext {
    pub fn new(api: Arc<dyn AtlasApi>, polling: PollSettings) -> Self {
        Self { api, polling }
    }
}

/// Lifecycle of one managed resource type
#[async_trait]
pub trait Resource: Send + Sync {
    /// Terraform type name, e.g. `mongodbatlas_cluster`
    fn type_name(&self) -> &'static str;

    /// Creates the remote object and returns its state
    async fn create(&self, config: Value) -> Result<Value>;

    /// Refreshes state; `None` means the object is gone and must be
    /// dropped from state
    async fn read(&self, state: Value) -> Result<Option<Value>>;

    /// Applies the planned configuration to an existing object
    async fn update(&self, prior: Value, planned: Value) -> Result<Value>;

    async fn delete(&self, state: Value) -> Result<()>;

    /// Builds state from a human-readable import ID
    async fn import(&self, import_id: &str) -> Result<Value>;
}

/// Read-only lookup of one object type
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    async fn read(&self, config: Value) -> Result<Value>;
}

/// Deserializes a configuration or state object into its typed form
pub(crate) fn parse_object<T: DeserializeOwned>(type_name: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::Validation(format!("{type_name}: {e}")))
}

/// Serializes typed state into a JSON object
pub(crate) fn to_state<T: Serialize>(state: &T) -> Result<Value> {
    serde_json::to_value(state).map_err(|e| ProviderError::Serialization(e.to_string()))
}

/// Rejects updates to attributes that force replacement
pub(crate) fn ensure_unchanged<T: PartialEq + std::fmt::Debug>(
    type_name: &str,
    attribute: &str,
    prior: &T,
    planned: &T,
) -> Result<()> {
    if prior != planned {
        return Err(ProviderError::Validation(format!(
            "{type_name}: '{attribute}' cannot be changed in place ({prior:?} -> {planned:?})"
        )));
    }
    Ok(())
}

/// Returns `None` when the error means the object no longer exists
pub(crate) fn gone_if_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
