//! Plugin boundary
//!
//! [`Provider`] owns one Atlas client shared by every resource and
//! dispatches lifecycle calls by Terraform type name.

use crate::adapters::atlas::{AtlasApi, AtlasClient};
use crate::config::ProviderConfig;
use crate::core::poll::PollSettings;
use crate::domain::{ProviderError, Result};
use crate::resources::cloud_backup_snapshot::CloudBackupSnapshotResource;
use crate::resources::cluster::{ClusterDataSource, ClusterResource};
use crate::resources::ip_access_list::IpAccessListResource;
use crate::resources::ldap_verify::LdapVerifyResource;
use crate::resources::project::{ProjectDataSource, ProjectResource};
use crate::resources::snapshot_restore_job::SnapshotRestoreJobResource;
use crate::resources::{DataSource, Resource, ResourceContext};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered resources and data sources
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Provider {
    /// Builds the provider from validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate().map_err(ProviderError::Configuration)?;

        let client = AtlasClient::new(&config.atlas)?;
        tracing::info!(base_url = %config.atlas.base_url, "Atlas client configured");

        Ok(Self::with_api(Arc::new(client), PollSettings::from_config(config)))
    }

    /// Builds the provider around any [`AtlasApi`] implementation
    pub fn with_api(api: Arc<dyn AtlasApi>, polling: PollSettings) -> Self {
        let ctx = ResourceContext::new(api, polling);

        let resources: Vec<Box<dyn Resource>> = vec![
            Box::new(ProjectResource::new(ctx.clone())),
            Box::new(ClusterResource::new(ctx.clone())),
            Box::new(IpAccessListResource::new(ctx.clone())),
            Box::new(CloudBackupSnapshotResource::new(ctx.clone())),
            Box::new(SnapshotRestoreJobResource::new(ctx.clone())),
            Box::new(LdapVerifyResource::new(ctx.clone())),
        ];
        let data_sources: Vec<Box<dyn DataSource>> = vec![
            Box::new(ProjectDataSource::new(ctx.clone())),
            Box::new(ClusterDataSource::new(ctx)),
        ];

        Self {
            resources: resources.into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }

    /// Type names of all managed resources, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub async fn create(&self, type_name: &str, config: Value) -> Result<Value> {
        tracing::debug!(resource = type_name, "create");
        self.resource(type_name)?.create(config).await
    }

    pub async fn read(&self, type_name: &str, state: Value) -> Result<Option<Value>> {
        tracing::debug!(resource = type_name, "read");
        self.resource(type_name)?.read(state).await
    }

    pub async fn update(&self, type_name: &str, prior: Value, planned: Value) -> Result<Value> {
        tracing::debug!(resource = type_name, "update");
        self.resource(type_name)?.update(prior, planned).await
    }

    pub async fn delete(&self, type_name: &str, state: Value) -> Result<()> {
        tracing::debug!(resource = type_name, "delete");
        self.resource(type_name)?.delete(state).await
    }

    pub async fn import(&self, type_name: &str, import_id: &str) -> Result<Value> {
        tracing::debug!(resource = type_name, import_id = import_id, "import");
        self.resource(type_name)?.import(import_id).await
    }

    pub async fn read_data_source(&self, type_name: &str, config: Value) -> Result<Value> {
        tracing::debug!(data_source = type_name, "read");
        let data_source = self
            .data_sources
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))?;
        data_source.read(config).await
    }
}
