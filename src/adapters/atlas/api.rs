//! Atlas API trait definition
//!
//! Resources talk to Atlas only through [`AtlasApi`], which keeps them
//! independent of the HTTP client and lets tests substitute a fake.

use super::models::{
    CloudBackupSnapshot, Cluster, IpAccessListEntry, IpAccessListPage, LdapVerification,
    LdapVerifyRequest, Project, SnapshotRequest, SnapshotRestoreJob,
};
use crate::domain::Result;
use async_trait::async_trait;

/// Atlas Admin API operations used by the provider
///
/// Every method maps to one REST call. Errors are
/// [`ProviderError::Api`](crate::domain::ProviderError::Api) values that
/// callers classify with `is_not_found()` and `is_transient()`.
#[async_trait]
pub trait AtlasApi: Send + Sync {
    /// `POST /groups`
    async fn create_project(&self, project: &Project) -> Result<Project>;

    /// `GET /groups/{project_id}`
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    /// `GET /groups/byName/{name}`
    async fn get_project_by_name(&self, name: &str) -> Result<Project>;

    /// `PATCH /groups/{project_id}`
    async fn update_project(&self, project_id: &str, name: &str) -> Result<Project>;

    /// `DELETE /groups/{project_id}`
    async fn delete_project(&self, project_id: &str) -> Result<()>;

    /// `POST /groups/{project_id}/clusters`
    async fn create_cluster(&self, project_id: &str, cluster: &Cluster) -> Result<Cluster>;

    /// `GET /groups/{project_id}/clusters/{cluster_name}`
    async fn get_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster>;

    /// `PATCH /groups/{project_id}/clusters/{cluster_name}`
    async fn update_cluster(
        &self,
        project_id: &str,
        cluster_name: &str,
        cluster: &Cluster,
    ) -> Result<Cluster>;

    /// `DELETE /groups/{project_id}/clusters/{cluster_name}`
    async fn delete_cluster(&self, project_id: &str, cluster_name: &str) -> Result<()>;

    /// `POST /groups/{project_id}/accessList`
    async fn create_ip_access_list(
        &self,
        project_id: &str,
        entries: &[IpAccessListEntry],
    ) -> Result<IpAccessListPage>;

    /// `GET /groups/{project_id}/accessList/{entry}`
    async fn get_ip_access_list_entry(
        &self,
        project_id: &str,
        entry: &str,
    ) -> Result<IpAccessListEntry>;

    /// `DELETE /groups/{project_id}/accessList/{entry}`
    async fn delete_ip_access_list_entry(&self, project_id: &str, entry: &str) -> Result<()>;

    /// `POST /groups/{project_id}/clusters/{cluster_name}/backup/snapshots`
    async fn create_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        request: &SnapshotRequest,
    ) -> Result<CloudBackupSnapshot>;

    /// `GET /groups/{project_id}/clusters/{cluster_name}/backup/snapshots/{snapshot_id}`
    async fn get_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<CloudBackupSnapshot>;

    /// `DELETE /groups/{project_id}/clusters/{cluster_name}/backup/snapshots/{snapshot_id}`
    async fn delete_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<()>;

    /// `POST /groups/{project_id}/clusters/{cluster_name}/backup/restoreJobs`
    async fn create_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job: &SnapshotRestoreJob,
    ) -> Result<SnapshotRestoreJob>;

    /// `GET /groups/{project_id}/clusters/{cluster_name}/backup/restoreJobs/{job_id}`
    async fn get_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<SnapshotRestoreJob>;

    /// `DELETE /groups/{project_id}/clusters/{cluster_name}/backup/restoreJobs/{job_id}`
    async fn cancel_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<()>;

    /// `POST /groups/{project_id}/userSecurity/ldap/verify`
    async fn verify_ldap(
        &self,
        project_id: &str,
        request: &LdapVerifyRequest,
    ) -> Result<LdapVerification>;

    /// `GET /groups/{project_id}/userSecurity/ldap/verify/{request_id}`
    async fn get_ldap_verification(
        &self,
        project_id: &str,
        request_id: &str,
    ) -> Result<LdapVerification>;
}
