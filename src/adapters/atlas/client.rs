//! Atlas Admin API HTTP client
//!
//! [`AtlasClient`] implements [`AtlasApi`] over reqwest. One client is built
//! per provider instance and shared read-only by every resource.

use super::api::AtlasApi;
use super::models::{
    ApiErrorBody, CloudBackupSnapshot, Cluster, IpAccessListEntry, IpAccessListPage,
    LdapVerification, LdapVerifyRequest, Project, SnapshotRequest, SnapshotRestoreJob,
};
use crate::config::{AtlasConnectionConfig, RetryConfig, SecretString};
use crate::domain::{AtlasApiError, ProviderError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// Path prefix of the Atlas Admin API v1.0
const API_PREFIX: [&str; 3] = ["api", "atlas", "v1.0"];

/// How requests authenticate
enum Credentials {
    /// Programmatic API key pair, sent as basic auth
    KeyPair {
        public_key: String,
        private_key: SecretString,
    },
    /// Service-account bearer token
    AccessToken(SecretString),
}

/// Atlas Admin API client
///
/// # Authentication
///
/// An access token is sent as a bearer token and works against Atlas
/// directly. An API key pair is sent with HTTP basic auth. Atlas itself only
/// accepts key pairs over digest auth, which this client does not perform, so
/// key-pair credentials only work against a basic-auth proxy in front of
/// Atlas or a mock server.
///
/// # Example
///
/// ```no_run
/// use mongodbatlas::adapters::atlas::{AtlasApi, AtlasClient};
/// use mongodbatlas::config::{secret_string, AtlasConnectionConfig};
///
/// # async fn example() -> mongodbatlas::domain::Result<()> {
/// let config = AtlasConnectionConfig {
///     public_key: Some("public".to_string()),
///     private_key: Some(secret_string("private".to_string())),
///     ..Default::default()
/// };
///
/// let client = AtlasClient::new(&config)?;
/// let cluster = client.get_cluster("5d0f1f73cf09a29120e173cf", "my-cluster").await?;
/// println!("{}", cluster.state_name);
/// # Ok(())
/// # }
/// ```
pub struct AtlasClient {
    base_url: Url,
    client: Client,
    credentials: Credentials,
    retry: RetryConfig,
}

impl AtlasClient {
    /// Builds a client from the `[atlas]` configuration section
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] when the base URL is invalid,
    /// credentials are missing, or the HTTP client cannot be built.
    pub fn new(config: &AtlasConnectionConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ProviderError::Configuration(format!("Invalid Atlas base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Configuration(format!(
                "Atlas base URL '{}' cannot be used as a base",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let credentials = match (&config.access_token, &config.public_key, &config.private_key) {
            (Some(token), _, _) if !token.expose_secret().is_empty() => {
                Credentials::AccessToken(token.clone())
            }
            (_, Some(public_key), Some(private_key)) => Credentials::KeyPair {
                public_key: public_key.clone(),
                private_key: private_key.clone(),
            },
            _ => {
                return Err(ProviderError::Configuration(
                    "Atlas credentials are required: set public_key and private_key, or access_token"
                        .to_string(),
                ))
            }
        };

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("mongodbatlas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        tracing::debug!(base_url = %base_url, "Atlas client created");

        Ok(Self {
            base_url,
            client,
            credentials,
            retry: config.retry.clone(),
        })
    }

    /// Builds the URL of an API path, percent-encoding every segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!(
                    "Atlas base URL '{}' cannot be used as a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Sends one request, retrying transport failures with exponential backoff
    async fn send(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Response> {
        let url = self.url(segments)?;
        let mut attempt = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header("Accept", "application/json");

            request = match &self.credentials {
                Credentials::KeyPair {
                    public_key,
                    private_key,
                } => request.basic_auth(public_key, Some(private_key.expose_secret())),
                Credentials::AccessToken(token) => request.bearer_auth(token.expose_secret()),
            };

            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(method = %method, path = %url.path(), "Atlas request");

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry.max_retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    let delay_ms = (self.retry.initial_delay_ms as f64
                        * self.retry.backoff_multiplier.powi(attempt as i32 - 1))
                        as u64;
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after connection error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(AtlasApiError::Connection(e.to_string()).into()),
            }
        }
    }

    /// Turns a non-2xx response into an [`AtlasApiError::Http`]
    async fn check(method: &Method, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let detail = body
            .detail
            .or(body.reason)
            .unwrap_or_else(|| text.trim().to_string());

        let err = AtlasApiError::Http {
            method: method.to_string(),
            path,
            status: status.as_u16(),
            error_code: body.error_code.unwrap_or_default(),
            detail,
        };

        tracing::debug!(error = %err, "Atlas request failed");
        Err(err.into())
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.send(method.clone(), segments, body.as_ref()).await?;
        let response = Self::check(&method, response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| AtlasApiError::InvalidResponse(e.to_string()).into())
    }

    async fn request_empty(&self, method: Method, segments: &[&str]) -> Result<()> {
        let response = self.send(method.clone(), segments, None).await?;
        Self::check(&method, response).await?;
        Ok(())
    }
}

fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProviderError::Serialization(e.to_string()))
}

#[async_trait]
impl AtlasApi for AtlasClient {
    async fn create_project(&self, project: &Project) -> Result<Project> {
        self.request_json(Method::POST, &["groups"], Some(to_body(project)?))
            .await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.request_json(Method::GET, &["groups", project_id], None)
            .await
    }

    async fn get_project_by_name(&self, name: &str) -> Result<Project> {
        self.request_json(Method::GET, &["groups", "byName", name], None)
            .await
    }

    async fn update_project(&self, project_id: &str, name: &str) -> Result<Project> {
        self.request_json(
            Method::PATCH,
            &["groups", project_id],
            Some(json!({ "name": name })),
        )
        .await
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.request_empty(Method::DELETE, &["groups", project_id])
            .await
    }

    async fn create_cluster(&self, project_id: &str, cluster: &Cluster) -> Result<Cluster> {
        self.request_json(
            Method::POST,
            &["groups", project_id, "clusters"],
            Some(to_body(cluster)?),
        )
        .await
    }

    async fn get_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        self.request_json(
            Method::GET,
            &["groups", project_id, "clusters", cluster_name],
            None,
        )
        .await
    }

    async fn update_cluster(
        &self,
        project_id: &str,
        cluster_name: &str,
        cluster: &Cluster,
    ) -> Result<Cluster> {
        self.request_json(
            Method::PATCH,
            &["groups", project_id, "clusters", cluster_name],
            Some(to_body(cluster)?),
        )
        .await
    }

    async fn delete_cluster(&self, project_id: &str, cluster_name: &str) -> Result<()> {
        self.request_empty(
            Method::DELETE,
            &["groups", project_id, "clusters", cluster_name],
        )
        .await
    }

    async fn create_ip_access_list(
        &self,
        project_id: &str,
        entries: &[IpAccessListEntry],
    ) -> Result<IpAccessListPage> {
        self.request_json(
            Method::POST,
            &["groups", project_id, "accessList"],
            Some(to_body(entries)?),
        )
        .await
    }

    async fn get_ip_access_list_entry(
        &self,
        project_id: &str,
        entry: &str,
    ) -> Result<IpAccessListEntry> {
        self.request_json(
            Method::GET,
            &["groups", project_id, "accessList", entry],
            None,
        )
        .await
    }

    async fn delete_ip_access_list_entry(&self, project_id: &str, entry: &str) -> Result<()> {
        self.request_empty(
            Method::DELETE,
            &["groups", project_id, "accessList", entry],
        )
        .await
    }

    async fn create_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        request: &SnapshotRequest,
    ) -> Result<CloudBackupSnapshot> {
        self.request_json(
            Method::POST,
            &["groups", project_id, "clusters", cluster_name, "backup", "snapshots"],
            Some(to_body(request)?),
        )
        .await
    }

    async fn get_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<CloudBackupSnapshot> {
        self.request_json(
            Method::GET,
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "snapshots",
                snapshot_id,
            ],
            None,
        )
        .await
    }

    async fn delete_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<()> {
        self.request_empty(
            Method::DELETE,
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "snapshots",
                snapshot_id,
            ],
        )
        .await
    }

    async fn create_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job: &SnapshotRestoreJob,
    ) -> Result<SnapshotRestoreJob> {
        self.request_json(
            Method::POST,
            &["groups", project_id, "clusters", cluster_name, "backup", "restoreJobs"],
            Some(to_body(job)?),
        )
        .await
    }

    async fn get_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<SnapshotRestoreJob> {
        self.request_json(
            Method::GET,
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "restoreJobs",
                job_id,
            ],
            None,
        )
        .await
    }

    async fn cancel_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<()> {
        self.request_empty(
            Method::DELETE,
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "restoreJobs",
                job_id,
            ],
        )
        .await
    }

    async fn verify_ldap(
        &self,
        project_id: &str,
        request: &LdapVerifyRequest,
    ) -> Result<LdapVerification> {
        self.request_json(
            Method::POST,
            &["groups", project_id, "userSecurity", "ldap", "verify"],
            Some(to_body(request)?),
        )
        .await
    }

    async fn get_ldap_verification(
        &self,
        project_id: &str,
        request_id: &str,
    ) -> Result<LdapVerification> {
        self.request_json(
            Method::GET,
            &["groups", project_id, "userSecurity", "ldap", "verify", request_id],
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(base_url: &str) -> AtlasConnectionConfig {
        AtlasConnectionConfig {
            base_url: base_url.to_string(),
            public_key: Some("public".to_string()),
            private_key: Some(secret_string("private".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = AtlasClient::new(&config("https://cloud.mongodb.com")).unwrap();
        let url = client
            .url(&["groups", "p1", "accessList", "10.0.0.0/16"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://cloud.mongodb.com/api/atlas/v1.0/groups/p1/accessList/10.0.0.0%2F16"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = AtlasClient::new(&config("http://localhost:8080/proxy/")).unwrap();
        let url = client.url(&["groups"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/api/atlas/v1.0/groups");
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = AtlasClient::new(&AtlasConnectionConfig::default());
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = AtlasClient::new(&config("not a url"));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_access_token_is_enough() {
        let config = AtlasConnectionConfig {
            access_token: Some(secret_string("token".to_string())),
            ..Default::default()
        };
        assert!(AtlasClient::new(&config).is_ok());
    }

    const PROJECT: &str = r#"{"id":"p1","name":"demo","orgId":"o1"}"#;

    #[tokio::test]
    async fn test_key_pair_sends_basic_auth() {
        use base64::{engine::general_purpose, Engine as _};

        let mut server = mockito::Server::new_async().await;
        let expected = format!("Basic {}", general_purpose::STANDARD.encode("public:private"));
        let mock = server
            .mock("GET", "/api/atlas/v1.0/groups/p1")
            .match_header("authorization", expected.as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PROJECT)
            .expect(1)
            .create_async()
            .await;

        let client = AtlasClient::new(&config(&server.url())).unwrap();
        let project = client.get_project("p1").await.unwrap();

        assert_eq!(project.name, "demo");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_access_token_sends_bearer_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/atlas/v1.0/groups/p1")
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PROJECT)
            .expect(1)
            .create_async()
            .await;

        let config = AtlasConnectionConfig {
            base_url: server.url(),
            public_key: Some("public".to_string()),
            private_key: Some(secret_string("private".to_string())),
            access_token: Some(secret_string("token".to_string())),
            ..Default::default()
        };
        let client = AtlasClient::new(&config).unwrap();
        client.get_project("p1").await.unwrap();

        mock.assert_async().await;
    }
}
