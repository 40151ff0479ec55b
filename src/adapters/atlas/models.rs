//! Atlas API wire models
//!
//! Field names follow the Atlas Admin API v1.0 (camelCase on the wire).
//! Only the fields the provider reads or writes are modeled; unknown fields
//! are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Error body returned by Atlas for non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<u16>,

    #[serde(default)]
    pub error_code: Option<String>,

    #[serde(default)]
    pub detail: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,
}

/// Link attached to most Atlas objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,

    #[serde(default)]
    pub rel: String,
}

/// Atlas project (called "group" in the API paths)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub name: String,

    pub org_id: String,

    #[serde(default, skip_serializing)]
    pub cluster_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Cloud provider settings of a cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    pub provider_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_size_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,

    /// Backing provider of shared-tier (`TENANT`) clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing_provider_name: Option<String>,
}

/// Connection strings of a cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStrings {
    #[serde(default)]
    pub standard: Option<String>,

    #[serde(default)]
    pub standard_srv: Option<String>,

    #[serde(default)]
    pub private: Option<String>,

    #[serde(default)]
    pub private_srv: Option<String>,
}

/// Atlas cluster, used both as request and response body
///
/// Request-only fields are `Option`s skipped when unset so a PATCH only
/// carries what changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, skip_serializing)]
    pub id: String,

    #[serde(default, skip_serializing)]
    pub group_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,

    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<f64>,

    #[serde(default, rename = "mongoDBMajorVersion", skip_serializing_if = "Option::is_none")]
    pub mongo_db_major_version: Option<String>,

    #[serde(default, rename = "mongoDBVersion", skip_serializing)]
    pub mongo_db_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_backup_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_settings: Option<ProviderSettings>,

    #[serde(default, rename = "mongoURI", skip_serializing)]
    pub mongo_uri: Option<String>,

    #[serde(default, skip_serializing)]
    pub srv_address: Option<String>,

    #[serde(default, skip_serializing)]
    pub connection_strings: Option<ConnectionStrings>,

    #[serde(default, skip_serializing)]
    pub state_name: String,
}

/// Entry of a project IP access list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAccessListEntry {
    #[serde(default, skip_serializing)]
    pub group_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_security_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One page of access-list entries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAccessListPage {
    #[serde(default)]
    pub results: Vec<IpAccessListEntry>,

    #[serde(default)]
    pub total_count: i64,
}

/// Request body for an on-demand cloud backup snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    pub description: String,
    pub retention_in_days: i64,
}

/// Cloud backup snapshot
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudBackupSnapshot {
    pub id: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub expires_at: Option<String>,

    #[serde(default, rename = "masterKeyUUID")]
    pub master_key_uuid: Option<String>,

    #[serde(default)]
    pub mongod_version: Option<String>,

    #[serde(default)]
    pub snapshot_type: Option<String>,

    #[serde(default)]
    pub storage_size_bytes: Option<i64>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub cloud_provider: Option<String>,
}

/// How a restore job delivers the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "automated")]
    Automated,
    #[serde(rename = "download")]
    Download,
    #[serde(rename = "pointInTime")]
    PointInTime,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Automated => "automated",
            DeliveryType::Download => "download",
            DeliveryType::PointInTime => "pointInTime",
        }
    }
}

/// Cloud backup snapshot restore job, used both as request and response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRestoreJob {
    #[serde(default, skip_serializing)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,

    pub delivery_type: DeliveryType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cluster_name: Option<String>,

    #[serde(default, rename = "targetGroupId", skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oplog_ts: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oplog_inc: Option<i64>,

    #[serde(default, rename = "pointInTimeUTCSeconds", skip_serializing_if = "Option::is_none")]
    pub point_in_time_utc_seconds: Option<i64>,

    #[serde(default, skip_serializing)]
    pub cancelled: bool,

    #[serde(default, skip_serializing)]
    pub failed: Option<bool>,

    #[serde(default, skip_serializing)]
    pub expired: bool,

    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing)]
    pub expires_at: Option<String>,

    #[serde(default, skip_serializing)]
    pub finished_at: Option<String>,

    #[serde(default, skip_serializing)]
    pub timestamp: Option<String>,

    #[serde(default, rename = "deliveryUrl", skip_serializing)]
    pub delivery_urls: Vec<String>,
}

impl SnapshotRestoreJob {
    /// Progress of the job as a poll status
    ///
    /// Atlas reports restore jobs through flags rather than a status field.
    pub fn status(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else if self.failed.unwrap_or(false) {
            "failed"
        } else if self.expired {
            "expired"
        } else if self.finished_at.is_some() {
            "completed"
        } else if self.created_at.is_none() {
            "queued"
        } else {
            "inProgress"
        }
    }
}

/// Request body for an LDAP configuration verification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapVerifyRequest {
    pub hostname: String,

    pub port: u16,

    pub bind_username: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bind_password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authz_query_template: Option<String>,
}

/// One check performed during an LDAP verification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapValidation {
    pub status: String,
    pub validation_type: String,
}

/// Status of an LDAP verification request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapVerification {
    #[serde(rename = "groupId")]
    pub project_id: String,

    pub request_id: String,

    #[serde(default)]
    pub request: Option<LdapVerifyRequest>,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub validations: Vec<LdapValidation>,

    #[serde(default)]
    pub links: Vec<Link>,
}
