//! `mongodbatlas_cloud_backup_snapshot` resource
//!
//! On-demand snapshots can only be taken of an `IDLE` cluster, so creation
//! first waits for the cluster to settle and then for the snapshot itself to
//! reach `completed`.

use super::cluster::refresh_cluster;
use super::{gone_if_not_found, parse_object, to_state, Resource, ResourceContext, ResourceTimeouts};
use crate::adapters::atlas::models::{CloudBackupSnapshot, SnapshotRequest};
use crate::adapters::atlas::AtlasApi;
use crate::core::poll::{Refresh, StateChangeConf};
use crate::domain::import_id::split_project_name_object;
use crate::domain::{ProviderError, Result, StateId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_cloud_backup_snapshot";

const IMPORT_FORMAT: &str = "{project_id}-{cluster_name}-{snapshot_id}";

const CLUSTER_BUSY: [&str; 4] = ["CREATING", "UPDATING", "REPAIRING", "REPEATING"];
const CLUSTER_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const CLUSTER_IDLE_INTERVAL: Duration = Duration::from_secs(10);
const CLUSTER_IDLE_DELAY: Duration = Duration::from_secs(3 * 60);

const SNAPSHOT_PENDING: [&str; 2] = ["queued", "inProgress"];
const SNAPSHOT_COMPLETED: &str = "completed";
const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(60);
const SNAPSHOT_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
struct SnapshotConfig {
    project_id: String,
    cluster_name: String,
    description: String,
    retention_in_days: i64,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

impl SnapshotConfig {
    fn validate(&self) -> Result<()> {
        self.timeouts.validate()?;
        if self.retention_in_days < 1 {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'retention_in_days' must be at least 1, got {}",
                self.retention_in_days
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SnapshotState {
    id: String,
    project_id: String,
    cluster_name: String,
    snapshot_id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    retention_in_days: Option<i64>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    master_key_uuid: Option<String>,
    #[serde(default)]
    mongod_version: Option<String>,
    #[serde(default)]
    snapshot_type: Option<String>,
    #[serde(default)]
    storage_size_bytes: Option<i64>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    cloud_provider: Option<String>,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

impl SnapshotState {
    fn from_snapshot(project_id: &str, cluster_name: &str, snapshot: CloudBackupSnapshot) -> Self {
        Self {
            id: StateId::new()
                .with("project_id", project_id)
                .with("cluster_name", cluster_name)
                .with("snapshot_id", snapshot.id.as_str())
                .encode(),
            project_id: project_id.to_string(),
            cluster_name: cluster_name.to_string(),
            snapshot_id: snapshot.id,
            description: snapshot.description,
            retention_in_days: None,
            status: snapshot.status,
            created_at: snapshot.created_at,
            expires_at: snapshot.expires_at,
            master_key_uuid: snapshot.master_key_uuid,
            mongod_version: snapshot.mongod_version,
            snapshot_type: snapshot.snapshot_type,
            storage_size_bytes: snapshot.storage_size_bytes,
            kind: snapshot.kind,
            cloud_provider: snapshot.cloud_provider,
            timeouts: ResourceTimeouts::default(),
        }
    }

    fn ids(&self) -> Result<(String, String, String)> {
        let ids = StateId::decode(&self.id);
        Ok((
            ids.require("project_id")?.to_string(),
            ids.require("cluster_name")?.to_string(),
            ids.require("snapshot_id")?.to_string(),
        ))
    }
}

async fn refresh_snapshot(
    api: &dyn AtlasApi,
    project_id: &str,
    cluster_name: &str,
    snapshot_id: &str,
) -> Result<Refresh<CloudBackupSnapshot>> {
    let snapshot = api.get_snapshot(project_id, cluster_name, snapshot_id).await?;
    let status = snapshot.status.clone();
    Ok(Refresh::new(snapshot, status))
}

pub struct CloudBackupSnapshotResource {
    ctx: ResourceContext,
}

impl CloudBackupSnapshotResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }

    async fn wait_cluster_idle(&self, project_id: &str, cluster_name: &str) -> Result<()> {
        let conf = self.ctx.polling.apply(
            StateChangeConf::new(CLUSTER_BUSY, ["IDLE"])
                .with_timeout(CLUSTER_IDLE_TIMEOUT)
                .with_poll_interval(CLUSTER_IDLE_INTERVAL)
                .with_delay(CLUSTER_IDLE_DELAY),
        );

        let api = self.ctx.api.as_ref();
        conf.wait_for_state(|| refresh_cluster(api, project_id, cluster_name))
            .await
            .map_err(|e| {
                ProviderError::from(e)
                    .context(format!("error waiting for cluster '{cluster_name}' to be IDLE"))
            })?;
        Ok(())
    }
}

#[async_trait]
impl Resource for CloudBackupSnapshotResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: SnapshotConfig = parse_object(TYPE_NAME, config)?;
        config.validate()?;
        let timeout = config.timeouts.create_or(DEFAULT_CREATE_TIMEOUT)?;
        let (project_id, cluster_name) = (config.project_id.as_str(), config.cluster_name.as_str());

        self.wait_cluster_idle(project_id, cluster_name).await?;

        let request = SnapshotRequest {
            description: config.description.clone(),
            retention_in_days: config.retention_in_days,
        };
        let requested = self
            .ctx
            .api
            .create_snapshot(project_id, cluster_name, &request)
            .await
            .map_err(|e| {
                e.context(format!("error taking snapshot of cluster '{cluster_name}'"))
            })?;

        tracing::info!(
            project_id = %project_id,
            cluster_name = %cluster_name,
            snapshot_id = %requested.id,
            "Snapshot requested, waiting for completion"
        );

        let conf = self.ctx.polling.apply(
            StateChangeConf::new(SNAPSHOT_PENDING, [SNAPSHOT_COMPLETED])
                .with_timeout(timeout)
                .with_poll_interval(SNAPSHOT_INTERVAL)
                .with_delay(SNAPSHOT_DELAY),
        );

        let api = self.ctx.api.as_ref();
        let snapshot_id = requested.id.as_str();
        let completed = conf
            .wait_for_state(|| refresh_snapshot(api, project_id, cluster_name, snapshot_id))
            .await
            .map_err(|e| {
                ProviderError::from(e).context(format!("error waiting for snapshot '{snapshot_id}'"))
            })?
            .unwrap_or_else(|| requested.clone());

        let mut state = SnapshotState::from_snapshot(project_id, cluster_name, completed);
        state.retention_in_days = Some(config.retention_in_days);
        state.timeouts = config.timeouts;
        to_state(&state)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let prior: SnapshotState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name, snapshot_id) = prior.ids()?;

        let snapshot = gone_if_not_found(
            self.ctx
                .api
                .get_snapshot(&project_id, &cluster_name, &snapshot_id)
                .await,
        )
        .map_err(|e| e.context(format!("error reading snapshot '{snapshot_id}'")))?;

        let Some(snapshot) = snapshot else {
            tracing::info!(snapshot_id = %snapshot_id, "Snapshot no longer exists, removing from state");
            return Ok(None);
        };

        let mut state = SnapshotState::from_snapshot(&project_id, &cluster_name, snapshot);
        state.retention_in_days = prior.retention_in_days;
        state.timeouts = prior.timeouts;
        Ok(Some(to_state(&state)?))
    }

    async fn update(&self, _prior: Value, _planned: Value) -> Result<Value> {
        Err(ProviderError::Validation(format!(
            "{TYPE_NAME}: snapshots cannot be updated in place, they must be replaced"
        )))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: SnapshotState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name, snapshot_id) = state.ids()?;

        match self
            .ctx
            .api
            .delete_snapshot(&project_id, &cluster_name, &snapshot_id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.context(format!("error deleting snapshot '{snapshot_id}'"))),
        }

        tracing::info!(snapshot_id = %snapshot_id, "Snapshot deleted");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let (project_id, cluster_name, snapshot_id) =
            split_project_name_object(import_id, IMPORT_FORMAT)?;

        let snapshot = self
            .ctx
            .api
            .get_snapshot(project_id, cluster_name, snapshot_id)
            .await
            .map_err(|e| e.context(format!("couldn't import snapshot '{import_id}'")))?;

        to_state(&SnapshotState::from_snapshot(project_id, cluster_name, snapshot))
    }
}
