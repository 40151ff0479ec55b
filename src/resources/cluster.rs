//! `mongodbatlas_cluster` resource and data source
//!
//! Cluster provisioning takes minutes to hours. Create and update return
//! once the cluster reports `IDLE`; delete returns once it is gone.

use super::{
    ensure_unchanged, gone_if_not_found, parse_object, to_state, DataSource, Resource,
    ResourceContext, ResourceTimeouts,
};
use crate::adapters::atlas::models::{Cluster, ConnectionStrings, ProviderSettings};
use crate::adapters::atlas::AtlasApi;
use crate::core::poll::{Refresh, StateChangeConf};
use crate::domain::import_id::{is_object_id, split_two};
use crate::domain::{AtlasApiError, ProviderError, Result, StateId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_cluster";

const IMPORT_FORMAT: &str = "{project_id}-{name}";

const PROVISIONING_PENDING: [&str; 5] =
    ["CREATING", "UPDATING", "REPAIRING", "REPEATING", "PENDING"];
const DELETE_PENDING: [&str; 5] = ["IDLE", "CREATING", "UPDATING", "REPAIRING", "DELETING"];
const IDLE: &str = "IDLE";
const DELETED: &str = "DELETED";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3 * 60 * 60);
const DEFAULT_CLUSTER_TYPE: &str = "REPLICASET";

#[derive(Debug, Clone, Deserialize)]
struct ClusterConfig {
    project_id: String,
    name: String,
    provider_name: String,
    provider_instance_size_name: String,
    #[serde(default)]
    provider_region_name: Option<String>,
    #[serde(default)]
    backing_provider_name: Option<String>,
    #[serde(default)]
    cluster_type: Option<String>,
    #[serde(default)]
    disk_size_gb: Option<f64>,
    #[serde(default)]
    mongo_db_major_version: Option<String>,
    #[serde(default)]
    backup_enabled: Option<bool>,
    #[serde(default)]
    cloud_backup: Option<bool>,
    #[serde(default)]
    pit_enabled: Option<bool>,
    #[serde(default)]
    paused: Option<bool>,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        self.timeouts.validate()?;

        if self.name.is_empty() {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'name' cannot be empty"
            )));
        }

        if self.provider_name == "TENANT" && self.backing_provider_name.is_none() {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'backing_provider_name' must be set when provider_name is TENANT"
            )));
        }

        if let Some(cluster_type) = &self.cluster_type {
            let valid_types = ["REPLICASET", "SHARDED", "GEOSHARDED"];
            if !valid_types.contains(&cluster_type.as_str()) {
                return Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: invalid cluster_type '{}'. Must be one of: {}",
                    cluster_type,
                    valid_types.join(", ")
                )));
            }
        }

        Ok(())
    }

    fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            provider_name: self.provider_name.clone(),
            instance_size_name: Some(self.provider_instance_size_name.clone()),
            region_name: self.provider_region_name.clone(),
            backing_provider_name: self.backing_provider_name.clone(),
        }
    }

    /// Request body with only the configured attributes set
    fn to_request(&self) -> Cluster {
        Cluster {
            name: self.name.clone(),
            cluster_type: self.cluster_type.clone(),
            disk_size_gb: self.disk_size_gb,
            mongo_db_major_version: self.mongo_db_major_version.as_deref().map(format_major_version),
            backup_enabled: self.backup_enabled,
            provider_backup_enabled: self.cloud_backup,
            pit_enabled: self.pit_enabled,
            provider_settings: Some(self.provider_settings()),
            ..Default::default()
        }
    }

    fn to_create_request(&self) -> Cluster {
        let mut request = self.to_request();
        request
            .cluster_type
            .get_or_insert_with(|| DEFAULT_CLUSTER_TYPE.to_string());
        request
    }
}

/// Normalizes a major version: `"6"` becomes `"6.0"`, `"4.4"` stays
fn format_major_version(version: &str) -> String {
    if version.contains('.') {
        version.to_string()
    } else {
        format!("{version}.0")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ClusterState {
    id: String,
    cluster_id: String,
    project_id: String,
    name: String,
    provider_name: String,
    #[serde(default)]
    provider_instance_size_name: Option<String>,
    #[serde(default)]
    provider_region_name: Option<String>,
    #[serde(default)]
    backing_provider_name: Option<String>,
    #[serde(default)]
    cluster_type: Option<String>,
    #[serde(default)]
    disk_size_gb: Option<f64>,
    #[serde(default)]
    mongo_db_major_version: Option<String>,
    #[serde(default)]
    mongo_db_version: Option<String>,
    #[serde(default)]
    backup_enabled: Option<bool>,
    #[serde(default)]
    cloud_backup: Option<bool>,
    #[serde(default)]
    pit_enabled: Option<bool>,
    #[serde(default)]
    paused: Option<bool>,
    #[serde(default)]
    mongo_uri: Option<String>,
    #[serde(default)]
    srv_address: Option<String>,
    #[serde(default)]
    connection_strings: Option<ConnectionStringsState>,
    #[serde(default)]
    state_name: String,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ConnectionStringsState {
    #[serde(default)]
    standard: Option<String>,
    #[serde(default)]
    standard_srv: Option<String>,
    #[serde(default)]
    private: Option<String>,
    #[serde(default)]
    private_srv: Option<String>,
}

impl From<ConnectionStrings> for ConnectionStringsState {
    fn from(strings: ConnectionStrings) -> Self {
        Self {
            standard: strings.standard,
            standard_srv: strings.standard_srv,
            private: strings.private,
            private_srv: strings.private_srv,
        }
    }
}

impl ClusterState {
    fn from_cluster(project_id: &str, cluster: Cluster, timeouts: ResourceTimeouts) -> Self {
        let settings = cluster.provider_settings.unwrap_or_default();

        let id = StateId::new()
            .with("cluster_id", cluster.id.as_str())
            .with("project_id", project_id)
            .with("cluster_name", cluster.name.as_str())
            .with("provider_name", settings.provider_name.as_str())
            .encode();

        Self {
            id,
            cluster_id: cluster.id,
            project_id: project_id.to_string(),
            name: cluster.name,
            provider_name: settings.provider_name,
            provider_instance_size_name: settings.instance_size_name,
            provider_region_name: settings.region_name,
            backing_provider_name: settings.backing_provider_name,
            cluster_type: cluster.cluster_type,
            disk_size_gb: cluster.disk_size_gb,
            mongo_db_major_version: cluster.mongo_db_major_version,
            mongo_db_version: cluster.mongo_db_version,
            backup_enabled: cluster.backup_enabled,
            cloud_backup: cluster.provider_backup_enabled,
            pit_enabled: cluster.pit_enabled,
            paused: cluster.paused,
            mongo_uri: cluster.mongo_uri,
            srv_address: cluster.srv_address,
            connection_strings: cluster.connection_strings.map(ConnectionStringsState::from),
            state_name: cluster.state_name,
            timeouts,
        }
    }
}

/// Status check used by every cluster wait
///
/// A dropped connection reads as `REPEATING`, 503 as `PENDING` and a missing
/// cluster as `DELETED`.
pub(crate) async fn refresh_cluster(
    api: &dyn AtlasApi,
    project_id: &str,
    cluster_name: &str,
) -> Result<Refresh<Cluster>> {
    match api.get_cluster(project_id, cluster_name).await {
        Ok(cluster) => {
            let status = cluster.state_name.clone();
            Ok(Refresh::new(cluster, status))
        }
        Err(err) => {
            let status = if err.is_not_found() {
                Some(DELETED)
            } else {
                match err.api_error() {
                    Some(AtlasApiError::Connection(msg)) if msg.contains("reset") => {
                        Some("REPEATING")
                    }
                    Some(api_err) if api_err.status() == Some(503) => Some("PENDING"),
                    _ => None,
                }
            };

            match status {
                Some(status) => Ok(Refresh::status_only(status)),
                None => Err(err),
            }
        }
    }
}

pub struct ClusterResource {
    ctx: ResourceContext,
}

impl ClusterResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }

    /// Waits for the cluster to become `IDLE` and returns its final view
    async fn wait_idle(
        &self,
        project_id: &str,
        cluster_name: &str,
        pending: [&str; 5],
        timeout: Duration,
        poll_interval: Duration,
        delay: Duration,
    ) -> Result<Cluster> {
        let conf = self.ctx.polling.apply(
            StateChangeConf::new(pending, [IDLE])
                .with_timeout(timeout)
                .with_poll_interval(poll_interval)
                .with_delay(delay),
        );

        let api = self.ctx.api.as_ref();
        let cluster = conf
            .wait_for_state(|| refresh_cluster(api, project_id, cluster_name))
            .await?;

        match cluster {
            Some(cluster) => Ok(cluster),
            None => api.get_cluster(project_id, cluster_name).await,
        }
    }

    fn ids(state: &ClusterState) -> Result<(String, String)> {
        let ids = StateId::decode(&state.id);
        Ok((
            ids.require("project_id")?.to_string(),
            ids.require("cluster_name")?.to_string(),
        ))
    }
}

#[async_trait]
impl Resource for ClusterResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: ClusterConfig = parse_object(TYPE_NAME, config)?;
        config.validate()?;

        if config.paused == Some(true) {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'paused' can only be set on an existing cluster"
            )));
        }

        let timeout = config.timeouts.create_or(DEFAULT_TIMEOUT)?;

        self.ctx
            .api
            .create_cluster(&config.project_id, &config.to_create_request())
            .await
            .map_err(|e| e.context(format!("error creating cluster '{}'", config.name)))?;

        tracing::info!(
            project_id = %config.project_id,
            cluster_name = %config.name,
            "Cluster creation requested, waiting for IDLE"
        );

        let cluster = self
            .wait_idle(
                &config.project_id,
                &config.name,
                PROVISIONING_PENDING,
                timeout,
                Duration::from_secs(60),
                Duration::from_secs(180),
            )
            .await
            .map_err(|e| e.context(format!("error creating cluster '{}'", config.name)))?;

        to_state(&ClusterState::from_cluster(
            &config.project_id,
            cluster,
            config.timeouts,
        ))
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let state: ClusterState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name) = Self::ids(&state)?;

        let cluster = gone_if_not_found(self.ctx.api.get_cluster(&project_id, &cluster_name).await)
            .map_err(|e| e.context(format!("error reading cluster '{cluster_name}'")))?;

        match cluster {
            Some(cluster) => Ok(Some(to_state(&ClusterState::from_cluster(
                &project_id,
                cluster,
                state.timeouts,
            ))?)),
            None => {
                tracing::info!(cluster_name = %cluster_name, "Cluster no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value> {
        let prior: ClusterState = parse_object(TYPE_NAME, prior)?;
        let planned: ClusterConfig = parse_object(TYPE_NAME, planned)?;
        planned.validate()?;
        let (project_id, cluster_name) = Self::ids(&prior)?;

        ensure_unchanged(TYPE_NAME, "project_id", &project_id, &planned.project_id)?;
        ensure_unchanged(TYPE_NAME, "name", &cluster_name, &planned.name)?;
        ensure_unchanged(TYPE_NAME, "provider_name", &prior.provider_name, &planned.provider_name)?;

        let timeout = planned.timeouts.update_or(DEFAULT_TIMEOUT)?;

        let mut patch = planned.to_request();
        patch.name = String::new();
        if prior.paused != planned.paused {
            patch.paused = planned.paused;
        }

        self.ctx
            .api
            .update_cluster(&project_id, &cluster_name, &patch)
            .await
            .map_err(|e| e.context(format!("error updating cluster '{cluster_name}'")))?;

        let cluster = self
            .wait_idle(
                &project_id,
                &cluster_name,
                PROVISIONING_PENDING,
                timeout,
                Duration::from_secs(30),
                Duration::from_secs(60),
            )
            .await
            .map_err(|e| e.context(format!("error updating cluster '{cluster_name}'")))?;

        to_state(&ClusterState::from_cluster(&project_id, cluster, planned.timeouts))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: ClusterState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name) = Self::ids(&state)?;
        let timeout = state.timeouts.delete_or(DEFAULT_TIMEOUT)?;

        match self.ctx.api.delete_cluster(&project_id, &cluster_name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.context(format!("error deleting cluster '{cluster_name}'"))),
        }

        let conf = self.ctx.polling.apply(
            StateChangeConf::new(DELETE_PENDING, [DELETED])
                .with_timeout(timeout)
                .with_poll_interval(Duration::from_secs(30))
                .with_delay(Duration::from_secs(60))
                .for_deletion(),
        );

        let api = self.ctx.api.as_ref();
        conf.wait_for_state(|| refresh_cluster(api, &project_id, &cluster_name))
            .await
            .map_err(|e| {
                ProviderError::from(e).context(format!("error deleting cluster '{cluster_name}'"))
            })?;

        tracing::info!(cluster_name = %cluster_name, "Cluster deleted");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let (project_id, cluster_name) = split_two(import_id, IMPORT_FORMAT)?;
        if !is_object_id(project_id) {
            return Err(ProviderError::ImportFormat(format!(
                "use the format {IMPORT_FORMAT}"
            )));
        }

        let cluster = self
            .ctx
            .api
            .get_cluster(project_id, cluster_name)
            .await
            .map_err(|e| {
                e.context(format!(
                    "couldn't import cluster '{cluster_name}' in project '{project_id}'"
                ))
            })?;

        to_state(&ClusterState::from_cluster(
            project_id,
            cluster,
            ResourceTimeouts::default(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ClusterLookup {
    project_id: String,
    name: String,
}

/// Looks a cluster up by project and name
pub struct ClusterDataSource {
    ctx: ResourceContext,
}

impl ClusterDataSource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl DataSource for ClusterDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn read(&self, config: Value) -> Result<Value> {
        let lookup: ClusterLookup = parse_object(TYPE_NAME, config)?;
        let cluster = self
            .ctx
            .api
            .get_cluster(&lookup.project_id, &lookup.name)
            .await
            .map_err(|e| e.context(format!("error reading cluster '{}'", lookup.name)))?;

        to_state(&ClusterState::from_cluster(
            &lookup.project_id,
            cluster,
            ResourceTimeouts::default(),
        ))
    }
}
