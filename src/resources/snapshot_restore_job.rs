//! `mongodbatlas_cloud_backup_snapshot_restore_job` resource

use super::{gone_if_not_found, parse_object, to_state, Resource, ResourceContext, ResourceTimeouts};
use crate::adapters::atlas::models::{DeliveryType, SnapshotRestoreJob};
use crate::adapters::atlas::AtlasApi;
use crate::core::poll::{Refresh, StateChangeConf};
use crate::domain::import_id::split_project_name_object;
use crate::domain::{ProviderError, Result, StateId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_cloud_backup_snapshot_restore_job";

const IMPORT_FORMAT: &str = "{project_id}-{cluster_name}-{snapshot_restore_job_id}";

const RESTORE_PENDING: [&str; 2] = ["queued", "inProgress"];
const RESTORE_COMPLETED: &str = "completed";
const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const RESTORE_INTERVAL: Duration = Duration::from_secs(60);
const RESTORE_DELAY: Duration = Duration::from_secs(60);

/// The `delivery_type_config` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DeliveryTypeConfig {
    #[serde(default)]
    automated: bool,
    #[serde(default)]
    download: bool,
    #[serde(default)]
    point_in_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oplog_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oplog_inc: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point_in_time_utc_seconds: Option<i64>,
}

impl DeliveryTypeConfig {
    fn delivery_type(&self) -> Result<DeliveryType> {
        let chosen: Vec<DeliveryType> = [
            (self.automated, DeliveryType::Automated),
            (self.download, DeliveryType::Download),
            (self.point_in_time, DeliveryType::PointInTime),
        ]
        .into_iter()
        .filter_map(|(set, kind)| set.then_some(kind))
        .collect();

        match chosen.as_slice() {
            [kind] => Ok(*kind),
            _ => Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: exactly one of delivery_type_config.automated, download or point_in_time must be true"
            ))),
        }
    }

    fn validate(&self) -> Result<DeliveryType> {
        let kind = self.delivery_type()?;

        let has_target = self.target_cluster_name.as_deref().is_some_and(|v| !v.is_empty())
            && self.target_project_id.as_deref().is_some_and(|v| !v.is_empty());

        match kind {
            DeliveryType::Automated | DeliveryType::PointInTime if !has_target => {
                Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: {} delivery requires target_cluster_name and target_project_id",
                    kind.as_str()
                )))
            }
            DeliveryType::PointInTime
                if self.point_in_time_utc_seconds.is_none()
                    && (self.oplog_ts.is_none() || self.oplog_inc.is_none()) =>
            {
                Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: pointInTime delivery requires point_in_time_utc_seconds or both oplog_ts and oplog_inc"
                )))
            }
            _ => Ok(kind),
        }
    }

    fn from_job(job: &SnapshotRestoreJob) -> Self {
        Self {
            automated: job.delivery_type == DeliveryType::Automated,
            download: job.delivery_type == DeliveryType::Download,
            point_in_time: job.delivery_type == DeliveryType::PointInTime,
            target_cluster_name: job.target_cluster_name.clone(),
            target_project_id: job.target_project_id.clone(),
            oplog_ts: job.oplog_ts,
            oplog_inc: job.oplog_inc,
            point_in_time_utc_seconds: job.point_in_time_utc_seconds,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RestoreJobConfig {
    project_id: String,
    cluster_name: String,
    #[serde(default)]
    snapshot_id: Option<String>,
    delivery_type_config: DeliveryTypeConfig,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

impl RestoreJobConfig {
    fn to_request(&self) -> Result<SnapshotRestoreJob> {
        self.timeouts.validate()?;
        let delivery = &self.delivery_type_config;
        let kind = delivery.validate()?;

        if kind != DeliveryType::PointInTime && self.snapshot_id.as_deref().map_or(true, str::is_empty)
        {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'snapshot_id' is required for {} delivery",
                kind.as_str()
            )));
        }

        Ok(SnapshotRestoreJob {
            id: String::new(),
            snapshot_id: self.snapshot_id.clone().filter(|v| !v.is_empty()),
            delivery_type: kind,
            target_cluster_name: delivery.target_cluster_name.clone(),
            target_project_id: delivery.target_project_id.clone(),
            oplog_ts: delivery.oplog_ts,
            oplog_inc: delivery.oplog_inc,
            point_in_time_utc_seconds: delivery.point_in_time_utc_seconds,
            cancelled: false,
            failed: None,
            expired: false,
            created_at: None,
            expires_at: None,
            finished_at: None,
            timestamp: None,
            delivery_urls: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RestoreJobState {
    id: String,
    project_id: String,
    cluster_name: String,
    snapshot_restore_job_id: String,
    #[serde(default)]
    snapshot_id: Option<String>,
    delivery_type_config: DeliveryTypeConfig,
    #[serde(default)]
    cancelled: bool,
    #[serde(default)]
    failed: bool,
    #[serde(default)]
    expired: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    finished_at: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    delivery_url: Vec<String>,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

impl RestoreJobState {
    fn from_job(project_id: &str, cluster_name: &str, job: SnapshotRestoreJob) -> Self {
        Self {
            id: StateId::new()
                .with("project_id", project_id)
                .with("cluster_name", cluster_name)
                .with("snapshot_restore_job_id", job.id.as_str())
                .encode(),
            project_id: project_id.to_string(),
            cluster_name: cluster_name.to_string(),
            delivery_type_config: DeliveryTypeConfig::from_job(&job),
            snapshot_restore_job_id: job.id,
            snapshot_id: job.snapshot_id,
            cancelled: job.cancelled,
            failed: job.failed.unwrap_or(false),
            expired: job.expired,
            created_at: job.created_at,
            expires_at: job.expires_at,
            finished_at: job.finished_at,
            timestamp: job.timestamp,
            delivery_url: job.delivery_urls,
            timeouts: ResourceTimeouts::default(),
        }
    }

    fn ids(&self) -> Result<(String, String, String)> {
        let ids = StateId::decode(&self.id);
        Ok((
            ids.require("project_id")?.to_string(),
            ids.require("cluster_name")?.to_string(),
            ids.require("snapshot_restore_job_id")?.to_string(),
        ))
    }
}

async fn refresh_restore_job(
    api: &dyn AtlasApi,
    project_id: &str,
    cluster_name: &str,
    job_id: &str,
) -> Result<Refresh<SnapshotRestoreJob>> {
    let job = api.get_restore_job(project_id, cluster_name, job_id).await?;
    let status = job.status();
    Ok(Refresh::new(job, status))
}

pub struct SnapshotRestoreJobResource {
    ctx: ResourceContext,
}

impl SnapshotRestoreJobResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Resource for SnapshotRestoreJobResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: RestoreJobConfig = parse_object(TYPE_NAME, config)?;
        let request = config.to_request()?;
        let timeout = config.timeouts.create_or(DEFAULT_CREATE_TIMEOUT)?;
        let (project_id, cluster_name) = (config.project_id.as_str(), config.cluster_name.as_str());

        let requested = self
            .ctx
            .api
            .create_restore_job(project_id, cluster_name, &request)
            .await
            .map_err(|e| {
                e.context(format!("error restoring a snapshot of cluster '{cluster_name}'"))
            })?;

        tracing::info!(
            project_id = %project_id,
            cluster_name = %cluster_name,
            job_id = %requested.id,
            delivery_type = request.delivery_type.as_str(),
            "Restore job submitted, waiting for completion"
        );

        let conf = self.ctx.polling.apply(
            StateChangeConf::new(RESTORE_PENDING, [RESTORE_COMPLETED])
                .with_timeout(timeout)
                .with_poll_interval(RESTORE_INTERVAL)
                .with_delay(RESTORE_DELAY),
        );

        let api = self.ctx.api.as_ref();
        let job_id = requested.id.as_str();
        let finished = conf
            .wait_for_state(|| refresh_restore_job(api, project_id, cluster_name, job_id))
            .await
            .map_err(|e| {
                ProviderError::from(e).context(format!("error waiting for restore job '{job_id}'"))
            })?
            .unwrap_or_else(|| requested.clone());

        let mut state = RestoreJobState::from_job(project_id, cluster_name, finished);
        state.delivery_type_config = config.delivery_type_config;
        if state.snapshot_id.is_none() {
            state.snapshot_id = config.snapshot_id;
        }
        state.timeouts = config.timeouts;
        to_state(&state)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let prior: RestoreJobState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name, job_id) = prior.ids()?;

        let job = gone_if_not_found(
            self.ctx
                .api
                .get_restore_job(&project_id, &cluster_name, &job_id)
                .await,
        )
        .map_err(|e| e.context(format!("error reading restore job '{job_id}'")))?;

        let Some(job) = job else {
            tracing::info!(job_id = %job_id, "Restore job no longer exists, removing from state");
            return Ok(None);
        };

        let mut state = RestoreJobState::from_job(&project_id, &cluster_name, job);
        state.delivery_type_config = prior.delivery_type_config;
        state.timeouts = prior.timeouts;
        Ok(Some(to_state(&state)?))
    }

    async fn update(&self, _prior: Value, _planned: Value) -> Result<Value> {
        Err(ProviderError::Validation(format!(
            "{TYPE_NAME}: restore jobs cannot be updated in place, they must be replaced"
        )))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: RestoreJobState = parse_object(TYPE_NAME, state)?;
        let (project_id, cluster_name, job_id) = state.ids()?;

        // Automated restores cannot be cancelled; the job is only dropped from state.
        if state.delivery_type_config.automated {
            tracing::info!(job_id = %job_id, "Automated restore job removed from state");
            return Ok(());
        }

        match self
            .ctx
            .api
            .cancel_restore_job(&project_id, &cluster_name, &job_id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.context(format!("error cancelling restore job '{job_id}'"))),
        }

        tracing::info!(job_id = %job_id, "Restore job cancelled");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let (project_id, cluster_name, job_id) =
            split_project_name_object(import_id, IMPORT_FORMAT)?;

        let job = self
            .ctx
            .api
            .get_restore_job(project_id, cluster_name, job_id)
            .await
            .map_err(|e| e.context(format!("couldn't import restore job '{import_id}'")))?;

        to_state(&RestoreJobState::from_job(project_id, cluster_name, job))
    }
}
