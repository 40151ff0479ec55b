//! `mongodbatlas_ldap_verify` resource
//!
//! Asks Atlas to test an LDAP configuration against the project. The
//! request is one-shot: the resource waits for a verdict and keeps it in
//! state. Deleting it only forgets the result.

use super::{gone_if_not_found, parse_object, to_state, Resource, ResourceContext, ResourceTimeouts};
use crate::adapters::atlas::models::{Link, LdapVerification, LdapVerifyRequest};
use crate::adapters::atlas::AtlasApi;
use crate::core::poll::{Refresh, StateChangeConf};
use crate::domain::import_id::split_two;
use crate::domain::{ProviderError, Result, StateId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TYPE_NAME: &str = "mongodbatlas_ldap_verify";

const IMPORT_FORMAT: &str = "{project_id}-{request_id}";

const VERIFY_PENDING: [&str; 1] = ["PENDING"];
const VERIFY_DONE: [&str; 2] = ["SUCCESS", "FAILED"];
const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(3 * 60 * 60);
const VERIFY_INTERVAL: Duration = Duration::from_secs(60);
const VERIFY_DELAY: Duration = Duration::from_secs(3 * 60);

fn default_port() -> u16 {
    636
}

#[derive(Debug, Clone, Deserialize)]
struct LdapVerifyConfig {
    project_id: String,
    hostname: String,
    #[serde(default = "default_port")]
    port: u16,
    bind_username: String,
    bind_password: String,
    #[serde(default)]
    ca_certificate: Option<String>,
    #[serde(default)]
    authz_query_template: Option<String>,
    #[serde(default)]
    timeouts: ResourceTimeouts,
}

impl LdapVerifyConfig {
    fn to_request(&self) -> Result<LdapVerifyRequest> {
        self.timeouts.validate()?;

        for (attribute, value) in [
            ("hostname", &self.hostname),
            ("bind_username", &self.bind_username),
            ("bind_password", &self.bind_password),
        ] {
            if value.is_empty() {
                return Err(ProviderError::Validation(format!(
                    "{TYPE_NAME}: '{attribute}' cannot be empty"
                )));
            }
        }

        Ok(LdapVerifyRequest {
            hostname: self.hostname.clone(),
            port: self.port,
            bind_username: self.bind_username.clone(),
            bind_password: self.bind_password.clone(),
            ca_certificate: self.ca_certificate.clone(),
            authz_query_template: self.authz_query_template.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ValidationState {
    status: String,
    validation_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LdapVerifyState {
    id: String,
    project_id: String,
    request_id: String,
    #[serde(default)]
    hostname: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    bind_username: String,
    /// Atlas never returns the password, so it is carried over from config
    #[serde(default)]
    bind_password: String,
    #[serde(default)]
    ca_certificate: Option<String>,
    #[serde(default)]
    authz_query_template: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    validations: Vec<ValidationState>,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default, skip_serializing_if = "ResourceTimeouts::is_empty")]
    timeouts: ResourceTimeouts,
}

impl LdapVerifyState {
    fn from_verification(verification: LdapVerification, bind_password: String) -> Self {
        let request = verification.request.unwrap_or_default();

        Self {
            id: StateId::new()
                .with("project_id", verification.project_id.as_str())
                .with("request_id", verification.request_id.as_str())
                .encode(),
            project_id: verification.project_id,
            request_id: verification.request_id,
            hostname: request.hostname,
            port: if request.port == 0 { default_port() } else { request.port },
            bind_username: request.bind_username,
            bind_password,
            ca_certificate: request.ca_certificate,
            authz_query_template: request.authz_query_template,
            status: verification.status,
            validations: verification
                .validations
                .into_iter()
                .map(|v| ValidationState {
                    status: v.status,
                    validation_type: v.validation_type,
                })
                .collect(),
            links: verification.links,
            timeouts: ResourceTimeouts::default(),
        }
    }

    /// Fills in request attributes the verification response left out
    fn merge_config(&mut self, config: &LdapVerifyConfig) {
        if self.hostname.is_empty() {
            self.hostname = config.hostname.clone();
            self.port = config.port;
        }
        if self.bind_username.is_empty() {
            self.bind_username = config.bind_username.clone();
        }
        if self.ca_certificate.is_none() {
            self.ca_certificate = config.ca_certificate.clone();
        }
        if self.authz_query_template.is_none() {
            self.authz_query_template = config.authz_query_template.clone();
        }
    }

    fn ids(&self) -> Result<(String, String)> {
        let ids = StateId::decode(&self.id);
        Ok((
            ids.require("project_id")?.to_string(),
            ids.require("request_id")?.to_string(),
        ))
    }
}

async fn refresh_verification(
    api: &dyn AtlasApi,
    project_id: &str,
    request_id: &str,
) -> Result<Refresh<LdapVerification>> {
    let verification = api.get_ldap_verification(project_id, request_id).await?;
    let status = verification.status.clone();
    Ok(Refresh::new(verification, status))
}

pub struct LdapVerifyResource {
    ctx: ResourceContext,
}

impl LdapVerifyResource {
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Resource for LdapVerifyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let config: LdapVerifyConfig = parse_object(TYPE_NAME, config)?;
        let request = config.to_request()?;
        let timeout = config.timeouts.create_or(DEFAULT_CREATE_TIMEOUT)?;
        let project_id = config.project_id.as_str();

        let submitted = self
            .ctx
            .api
            .verify_ldap(project_id, &request)
            .await
            .map_err(|e| e.context(format!("error verifying LDAP configuration for '{project_id}'")))?;

        tracing::info!(
            project_id = %project_id,
            request_id = %submitted.request_id,
            hostname = %config.hostname,
            "LDAP verification requested"
        );

        let conf = self.ctx.polling.apply(
            StateChangeConf::new(VERIFY_PENDING, VERIFY_DONE)
                .with_timeout(timeout)
                .with_poll_interval(VERIFY_INTERVAL)
                .with_delay(VERIFY_DELAY),
        );

        let api = self.ctx.api.as_ref();
        let request_id = submitted.request_id.as_str();
        let verification = conf
            .wait_for_state(|| refresh_verification(api, project_id, request_id))
            .await
            .map_err(|e| {
                ProviderError::from(e)
                    .context(format!("error waiting for LDAP verification '{request_id}'"))
            })?
            .unwrap_or_else(|| submitted.clone());

        if verification.status == "FAILED" {
            tracing::warn!(request_id = %verification.request_id, "LDAP verification failed");
        }

        let mut state = LdapVerifyState::from_verification(verification, config.bind_password.clone());
        if state.project_id.is_empty() {
            state.project_id = project_id.to_string();
            state.id = StateId::new()
                .with("project_id", project_id)
                .with("request_id", state.request_id.as_str())
                .encode();
        }
        state.merge_config(&config);
        state.timeouts = config.timeouts;
        to_state(&state)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let prior: LdapVerifyState = parse_object(TYPE_NAME, state)?;
        let (project_id, request_id) = prior.ids()?;

        let verification = gone_if_not_found(
            self.ctx
                .api
                .get_ldap_verification(&project_id, &request_id)
                .await,
        )
        .map_err(|e| e.context(format!("error reading LDAP verification '{request_id}'")))?;

        let Some(mut verification) = verification else {
            tracing::info!(request_id = %request_id, "LDAP verification no longer exists, removing from state");
            return Ok(None);
        };

        if verification.project_id.is_empty() {
            verification.project_id = project_id;
        }

        let mut state = LdapVerifyState::from_verification(verification, prior.bind_password);
        if state.hostname.is_empty() {
            state.hostname = prior.hostname;
            state.port = prior.port;
            state.bind_username = prior.bind_username;
        }
        state.timeouts = prior.timeouts;
        Ok(Some(to_state(&state)?))
    }

    async fn update(&self, _prior: Value, _planned: Value) -> Result<Value> {
        Err(ProviderError::Validation(format!(
            "{TYPE_NAME}: a verification cannot be updated, it must be replaced"
        )))
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: LdapVerifyState = parse_object(TYPE_NAME, state)?;
        tracing::info!(request_id = %state.request_id, "LDAP verification removed from state");
        Ok(())
    }

    async fn import(&self, import_id: &str) -> Result<Value> {
        let (project_id, request_id) = split_two(import_id, IMPORT_FORMAT)?;

        let mut verification = self
            .ctx
            .api
            .get_ldap_verification(project_id, request_id)
            .await
            .map_err(|e| e.context(format!("couldn't import LDAP verification '{import_id}'")))?;

        if verification.project_id.is_empty() {
            verification.project_id = project_id.to_string();
        }

        to_state(&LdapVerifyState::from_verification(verification, String::new()))
    }
}
