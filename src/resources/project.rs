//! `mongodbatlas_project` resource and data source

use super::{
    ensure_unchanged, gone_if_not_found, parse_object, to_state, DataSource, Resource,
    ResourceContext, ResourceTimeouts,
};
use crate::adapters::atlas::models::Project;
use crate::core::poll::{retry_until, RetryError};
use crate::domain::{ProviderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_project";

/// Error code returned while clusters of the project are still shutting down
const ACTIVE_CLUSTERS_CODE: &str = "CANNOT_CLOSE_GROUP_ACTIVE_ATLAS_CLUSTERS";

const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Deserialize)]
struct ProjectConfig {
    name: String,
    org_id: String,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProjectState {
    id: String,
    name: String,
    org_id: String,
    #[serde(default)]
    cluster_count: i64,
    #[serde(default)]
    created: Option<String>,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

impl ProjectState {
    fn from_project(project: Project, timeouts: ResourceTimeouts) -> Self {
        Self {
            id: project.id,
            name: project.name,
            org_id: project.org_id,
            cluster_count: project.cluster_count,
            created: project.created,
            timeouts,
        }
    }
}

pub struct ProjectResource {
    ctx: ResourceContext,
}

impl ProjectResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Resource for ProjectResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: ProjectConfig = parse_object(TYPE_NAME, config)?;
        config.timeouts.validate()?;

        if config.name.is_empty() {
            return Err(ProviderError::Validation(format!(
                "{TYPE_NAME}: 'name' cannot be empty"
            )));
        }

        let request = Project {
            name: config.name.clone(),
            org_id: config.org_id.clone(),
            ..Default::default()
        };

        let project = self
            .ctx
            .api
            .create_project(&request)
            .await
            .map_err(|e| e.context(format!("error creating project '{}'", config.name)))?;

        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        to_state(&ProjectState::from_project(project, config.timeouts))
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let state: ProjectState = parse_object(TYPE_NAME, state)?;

        let project = gone_if_not_found(self.ctx.api.get_project(&state.id).await)
            .map_err(|e| e.context(format!("error reading project '{}'", state.id)))?;

        match project {
            Some(project) => Ok(Some(to_state(&ProjectState::from_project(
                project,
                state.timeouts,
            ))?)),
            None => {
                tracing::info!(project_id = %state.id, "Project no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value> {
        let prior: ProjectState = parse_object(TYPE_NAME, prior)?;
        let planned: ProjectConfig = parse_object(TYPE_NAME, planned)?;
        planned.timeouts.validate()?;
        ensure_unchanged(TYPE_NAME, "org_id", &prior.org_id, &planned.org_id)?;

        let project = if prior.name != planned.name {
            self.ctx
                .api
                .update_project(&prior.id, &planned.name)
                .await
                .map_err(|e| e.context(format!("error updating project '{}'", prior.id)))?
        } else {
            self.ctx.api.get_project(&prior.id).await?
        };

        to_state(&ProjectState::from_project(project, planned.timeouts))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: ProjectState = parse_object(TYPE_NAME, state)?;
        let timeout = state.timeouts.delete_or(DEFAULT_DELETE_TIMEOUT)?;
        let api = &self.ctx.api;
        let project_id = state.id.as_str();

        retry_until(timeout, self.ctx.polling.retry_backoff(), || async move {
            match api.delete_project(project_id).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) if e.error_code() == Some(ACTIVE_CLUSTERS_CODE) => {
                    tracing::debug!(project_id = %project_id, "Project still has active clusters");
                    Err(RetryError::Retryable(e))
                }
                Err(e) => Err(RetryError::classify(e)),
            }
        })
        .await
        .map_err(|e| e.context(format!("error deleting project '{}'", state.id)))?;

        tracing::info!(project_id = %state.id, "Project deleted");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let project = self
            .ctx
            .api
            .get_project(import_id)
            .await
            .map_err(|e| e.context(format!("couldn't import project '{import_id}'")))?;

        to_state(&ProjectState::from_project(project, ResourceTimeouts::default()))
    }
}

#[derive(Debug, Deserialize)]
struct ProjectLookup {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Looks a project up by `project_id` or by `name`
pub struct ProjectDataSource {
    ctx: ResourceContext,
}

impl ProjectDataSource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl DataSource for ProjectDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn read(&self, config: Value) -> Result<Value> {
        let lookup: ProjectLookup = parse_object(TYPE_NAME, config)?;

        let project = match (lookup.project_id.as_deref(), lookup.name.as_deref()) {
            (Some(id), None) if !id.is_empty() => self.ctx.api.get_project(id).await?,
            (None, Some(name)) if !name.is_empty() => {
                self.ctx.api.get_project_by_name(name).await?
            }
            _ => {
                return Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: exactly one of 'project_id' or 'name' must be set"
                )))
            }
        };

        to_state(&ProjectState::from_project(project, ResourceTimeouts::default()))
    }
}
