//! `mongodbatlas_project_ip_access_list` resource
//!
//! Atlas accepts access-list writes asynchronously and sometimes answers
//! with transient 5xx errors while a previous change is still propagating.
//! Creation therefore re-submits the entry until it shows up in the list.

use super::{parse_object, to_state, Resource, ResourceContext, ResourceTimeouts};
use crate::adapters::atlas::models::IpAccessListEntry;
use crate::adapters::atlas::AtlasApi;
use crate::core::poll::{retry_until, Refresh, RetryError, StateChangeConf};
use crate::domain::import_id::split_two;
use crate::domain::{PollError, ProviderError, Result, StateId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_project_ip_access_list";

const IMPORT_FORMAT: &str = "{project_id}-{entry}";

const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(45 * 60);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const CREATE_POLL_INTERVAL: Duration = Duration::from_secs(2);
const CREATE_DELAY: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Deserialize)]
struct AccessListConfig {
    project_id: String,
    #[serde(default)]
    cidr_block: Option<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    aws_security_group: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

impl AccessListConfig {
    /// Validates the entry and returns the value Atlas indexes it by
    fn entry(&self) -> Result<String> {
        self.timeouts.validate()?;

        let set: Vec<(&str, &str)> = [
            ("cidr_block", self.cidr_block.as_deref()),
            ("ip_address", self.ip_address.as_deref()),
            ("aws_security_group", self.aws_security_group.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
        .collect();

        let (attribute, value) = match set.as_slice() {
            [single] => *single,
            _ => {
                return Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: exactly one of cidr_block, ip_address or aws_security_group must be set"
                )))
            }
        };

        match attribute {
            "cidr_block" => validate_cidr_network(value)?,
            "ip_address" => {
                value.parse::<IpAddr>().map_err(|_| {
                    ProviderError::Validation(format!(
                        "{TYPE_NAME}: ip_address '{value}' is not a valid IP address"
                    ))
                })?;
            }
            _ => {}
        }

        Ok(value.to_string())
    }

    fn to_request(&self) -> IpAccessListEntry {
        IpAccessListEntry {
            cidr_block: self.cidr_block.clone().filter(|v| !v.is_empty()),
            ip_address: self.ip_address.clone().filter(|v| !v.is_empty()),
            aws_security_group: self.aws_security_group.clone().filter(|v| !v.is_empty()),
            comment: self.comment.clone(),
            ..Default::default()
        }
    }
}

/// Accepts `address/prefix` only when the address is the network address
fn validate_cidr_network(cidr: &str) -> Result<()> {
    let invalid = || {
        ProviderError::Validation(format!(
            "{TYPE_NAME}: cidr_block '{cidr}' is not a valid CIDR network"
        ))
    };

    let (address, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    let address: IpAddr = address.parse().map_err(|_| invalid())?;
    let prefix: u32 = prefix.parse().map_err(|_| invalid())?;

    let is_network = match address {
        IpAddr::V4(v4) => {
            if prefix > 32 {
                return Err(invalid());
            }
            let bits = u32::from(v4);
            let host_mask = u32::MAX.checked_shr(prefix).unwrap_or(0);
            bits & host_mask == 0
        }
        IpAddr::V6(v6) => {
            if prefix > 128 {
                return Err(invalid());
            }
            let bits = u128::from(v6);
            let host_mask = u128::MAX.checked_shr(prefix).unwrap_or(0);
            bits & host_mask == 0
        }
    };

    if is_network {
        Ok(())
    } else {
        Err(invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AccessListState {
    id: String,
    project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cidr_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aws_security_group: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

impl AccessListState {
    fn new(project_id: &str, entry: &str) -> Self {
        Self {
            id: StateId::new()
                .with("project_id", project_id)
                .with("entry", entry)
                .encode(),
            project_id: project_id.to_string(),
            cidr_block: None,
            ip_address: None,
            aws_security_group: None,
            comment: None,
            timeouts: ResourceTimeouts::default(),
        }
    }

    fn ids(&self) -> Result<(String, String)> {
        let ids = StateId::decode(&self.id);
        Ok((
            ids.require("project_id")?.to_string(),
            ids.require("entry")?.to_string(),
        ))
    }
}

/// One create attempt: submit the entry, then check that it is listed
async fn submit_entry(
    api: &dyn AtlasApi,
    project_id: &str,
    request: &IpAccessListEntry,
    entry: &str,
) -> Result<Refresh<IpAccessListEntry>> {
    if let Err(err) = api
        .create_ip_access_list(project_id, std::slice::from_ref(request))
        .await
    {
        if err.is_transient() {
            tracing::debug!(entry = %entry, error = %err, "Access list write not accepted yet");
            return Ok(Refresh::status_only("pending"));
        }
        return Err(err);
    }

    match api.get_ip_access_list_entry(project_id, entry).await {
        Ok(found) => Ok(Refresh::new(found, "created")),
        Err(err) if err.is_transient() || err.is_not_found() => {
            Ok(Refresh::status_only("pending"))
        }
        Err(err) => Err(err),
    }
}

pub struct IpAccessListResource {
    ctx: ResourceContext,
}

impl IpAccessListResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }

    /// Fetches an entry, retrying transient failures; `None` if it is gone
    async fn fetch(
        &self,
        project_id: &str,
        entry: &str,
        timeout: Duration,
    ) -> Result<Option<IpAccessListEntry>> {
        let api = self.ctx.api.as_ref();

        retry_until(timeout, self.ctx.polling.retry_backoff(), || async move {
            match api.get_ip_access_list_entry(project_id, entry).await {
                Ok(found) => Ok(Some(found)),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(RetryError::classify(err)),
            }
        })
        .await
    }
}

#[async_trait]
impl Resource for IpAccessListResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: AccessListConfig = parse_object(TYPE_NAME, config)?;
        let entry = config.entry()?;
        let request = config.to_request();
        let timeout = config.timeouts.create_or(DEFAULT_CREATE_TIMEOUT)?;

        let conf = self.ctx.polling.apply(
            StateChangeConf::new(["pending"], ["created"])
                .with_timeout(timeout)
                .with_poll_interval(CREATE_POLL_INTERVAL)
                .with_delay(CREATE_DELAY),
        );

        let api = self.ctx.api.as_ref();
        let project_id = config.project_id.as_str();
        let created = conf
            .wait_for_state(|| submit_entry(api, project_id, &request, &entry))
            .await
            .map_err(|e| {
                ProviderError::from(e).context(format!("error creating access list entry '{entry}'"))
            })?;

        tracing::info!(project_id = %project_id, entry = %entry, "Access list entry created");

        let mut state = AccessListState::new(project_id, &entry);
        state.cidr_block = request.cidr_block;
        state.ip_address = request.ip_address;
        state.aws_security_group = request.aws_security_group;
        state.comment = created.and_then(|c| c.comment).or(config.comment);
        state.timeouts = config.timeouts;
        to_state(&state)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let mut state: AccessListState = parse_object(TYPE_NAME, state)?;
        let (project_id, entry) = state.ids()?;

        let found = self
            .fetch(&project_id, &entry, DEFAULT_READ_TIMEOUT)
            .await
            .map_err(|e| e.context(format!("error reading access list entry '{entry}'")))?;

        match found {
            Some(found) => {
                state.comment = found.comment;
                Ok(Some(to_state(&state)?))
            }
            None => {
                tracing::info!(entry = %entry, "Access list entry no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, _prior: Value, _planned: Value) -> Result<Value> {
        Err(ProviderError::Validation(format!(
            "{TYPE_NAME}: entries cannot be updated in place, they must be replaced"
        )))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: AccessListState = parse_object(TYPE_NAME, state)?;
        let (project_id, entry) = state.ids()?;
        let timeout = state.timeouts.delete_or(DEFAULT_DELETE_TIMEOUT)?;
        let api = self.ctx.api.as_ref();
        let (project_id, entry) = (project_id.as_str(), entry.as_str());

        retry_until(timeout, self.ctx.polling.retry_backoff(), || async move {
            match api.delete_ip_access_list_entry(project_id, entry).await {
                Ok(()) => {}
                Err(err) if err.is_not_found() => return Ok(()),
                Err(err) => return Err(RetryError::classify(err)),
            }

            match api.get_ip_access_list_entry(project_id, entry).await {
                Err(err) if err.is_not_found() => Ok(()),
                Err(err) => Err(RetryError::Retryable(err)),
                Ok(_) => Err(RetryError::Retryable(
                    PollError::UnexpectedState {
                        status: "exists".to_string(),
                        target: "deleted".to_string(),
                    }
                    .into(),
                )),
            }
        })
        .await
        .map_err(|e| e.context(format!("error deleting access list entry '{entry}'")))?;

        tracing::info!(project_id = %project_id, entry = %entry, "Access list entry deleted");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let (project_id, entry) = split_two(import_id, IMPORT_FORMAT)?;

        let found = self
            .fetch(project_id, entry, DEFAULT_READ_TIMEOUT)
            .await?
            .ok_or_else(|| {
                ProviderError::Validation(format!(
                    "{TYPE_NAME}: access list entry '{entry}' not found in project '{project_id}'"
                ))
            })?;

        let mut state = AccessListState::new(project_id, entry);
        if found.aws_security_group.is_some() {
            state.aws_security_group = found.aws_security_group;
        } else if found.ip_address.as_deref() == Some(entry) {
            state.ip_address = found.ip_address;
        } else {
            state.cidr_block = found.cidr_block.or_else(|| Some(entry.to_string()));
        }
        state.comment = found.comment;
        to_state(&state)
    }
}
