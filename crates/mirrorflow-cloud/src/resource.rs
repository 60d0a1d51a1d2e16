//! Resource model for the storage hierarchy
//!
//! Accounts contain capacity pools, pools contain volumes. Every entity is
//! referenced through an opaque [`ResourceHandle`] returned by the backend
//! at creation time.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Minimum capacity pool size: 4 TiB
pub const MIN_POOL_SIZE: u64 = 4 * TIB;
/// Maximum capacity pool size: 500 TiB
pub const MAX_POOL_SIZE: u64 = 500 * TIB;
/// Minimum volume quota: 100 GiB
pub const MIN_VOLUME_SIZE: u64 = 100 * GIB;
/// Maximum volume quota: 100 TiB
pub const MAX_VOLUME_SIZE: u64 = 100 * TIB;

pub const GIB: u64 = 1 << 30;
pub const TIB: u64 = 1 << 40;

/// Kind of managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Account,
    Pool,
    Volume,
}

impl ResourceKind {
    /// The kind a resource of this kind must be contained in, if any
    pub fn parent_kind(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Account => None,
            ResourceKind::Pool => Some(ResourceKind::Account),
            ResourceKind::Volume => Some(ResourceKind::Pool),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Account => write!(f, "account"),
            ResourceKind::Pool => write!(f, "pool"),
            ResourceKind::Volume => write!(f, "volume"),
        }
    }
}

/// Service level tier of a capacity pool, ranked by throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceLevel {
    Standard,
    Premium,
    Ultra,
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceLevel::Standard => write!(f, "Standard"),
            ServiceLevel::Premium => write!(f, "Premium"),
            ServiceLevel::Ultra => write!(f, "Ultra"),
        }
    }
}

/// Mount protocol of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "NFSv3")]
    Nfsv3,
    #[serde(rename = "NFSv4.1")]
    Nfsv41,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Nfsv3 => write!(f, "NFSv3"),
            Protocol::Nfsv41 => write!(f, "NFSv4.1"),
        }
    }
}

/// Replication transfer schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationSchedule {
    TenMinutes,
    Hourly,
    Daily,
}

impl ReplicationSchedule {
    /// Wire name used by the management API
    pub fn api_name(&self) -> &'static str {
        match self {
            ReplicationSchedule::TenMinutes => "_10minutely",
            ReplicationSchedule::Hourly => "hourly",
            ReplicationSchedule::Daily => "daily",
        }
    }
}

/// Properties of a storage account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    /// Region the account lives in
    pub location: String,
}

/// Properties of a capacity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSpec {
    /// Region, matching the containing account
    pub location: String,

    /// Pool size in bytes, within [`MIN_POOL_SIZE`, `MAX_POOL_SIZE`]
    pub size_bytes: u64,

    /// Service level tier
    pub service_level: ServiceLevel,
}

impl PoolSpec {
    pub fn validate(&self) -> Result<()> {
        if self.size_bytes < MIN_POOL_SIZE || self.size_bytes > MAX_POOL_SIZE {
            return Err(CloudError::InvalidConfig(format!(
                "pool size {} out of range [{}, {}]",
                self.size_bytes, MIN_POOL_SIZE, MAX_POOL_SIZE
            )));
        }
        Ok(())
    }
}

/// A single export policy rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPolicyRule {
    /// Rule order, starting at 1
    pub rule_index: u32,

    /// Clients the rule applies to, as a CIDR range
    pub allowed_clients: String,

    pub unix_read_only: bool,
    pub unix_read_write: bool,
    pub nfsv3: bool,
    pub nfsv41: bool,
}

impl ExportPolicyRule {
    /// Read-write rule for a single client range, matching the protocol
    pub fn read_write(allowed_clients: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            rule_index: 1,
            allowed_clients: allowed_clients.into(),
            unix_read_only: false,
            unix_read_write: true,
            nfsv3: protocol == Protocol::Nfsv3,
            nfsv41: protocol == Protocol::Nfsv41,
        }
    }
}

/// Replication descriptor attached to a data-protection volume.
///
/// `source` is the index of the source volume's step in the plan; the
/// sequencer resolves it to a handle before the create call goes out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSpec {
    pub source: usize,
    pub schedule: ReplicationSchedule,
}

/// Properties of a volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Region, matching the containing pool
    pub location: String,

    /// Export path component, unique within the region
    pub creation_token: String,

    /// Usage quota in bytes, within [`MIN_VOLUME_SIZE`, `MAX_VOLUME_SIZE`]
    pub size_bytes: u64,

    pub protocol: Protocol,

    /// Delegated subnet the volume is reachable from
    pub subnet_id: String,

    pub export_policy: Vec<ExportPolicyRule>,

    /// Present on replication-destination (data-protection) volumes
    pub replication: Option<ReplicationSpec>,
}

impl VolumeSpec {
    pub fn validate(&self) -> Result<()> {
        if self.size_bytes < MIN_VOLUME_SIZE || self.size_bytes > MAX_VOLUME_SIZE {
            return Err(CloudError::InvalidConfig(format!(
                "volume size {} out of range [{}, {}]",
                self.size_bytes, MIN_VOLUME_SIZE, MAX_VOLUME_SIZE
            )));
        }
        if self.export_policy.is_empty() {
            return Err(CloudError::InvalidConfig(format!(
                "volume {} has no export policy rules",
                self.creation_token
            )));
        }
        Ok(())
    }
}

/// Opaque identifier for a created resource, plus the metadata teardown
/// needs to pick the right deletion path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Backend-scoped resource identifier (an ARM resource ID for Azure)
    pub id: String,

    /// Short name the resource was created under
    pub name: String,

    pub kind: ResourceKind,

    /// Region the resource was created in
    pub location: String,

    /// Whether the resource is a replication-destination volume
    pub replicated: bool,
}

impl ResourceHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            location: String::new(),
            replicated: false,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_replication(mut self) -> Self {
        self.replicated = true;
        self
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Async provisioning state reported by the management plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningState {
    Accepted,
    Creating,
    Succeeded,
    Failed,
    Deleting,
    /// Anything the management plane reports that we do not model
    Unknown,
}

impl ProvisioningState {
    /// Parse the free-form status string returned by the API
    pub fn parse(s: &str) -> Self {
        match s {
            "Accepted" => ProvisioningState::Accepted,
            "Creating" => ProvisioningState::Creating,
            "Succeeded" => ProvisioningState::Succeeded,
            "Failed" => ProvisioningState::Failed,
            "Deleting" => ProvisioningState::Deleting,
            _ => ProvisioningState::Unknown,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ProvisioningState::Succeeded)
    }
}

impl std::fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisioningState::Accepted => write!(f, "Accepted"),
            ProvisioningState::Creating => write!(f, "Creating"),
            ProvisioningState::Succeeded => write!(f, "Succeeded"),
            ProvisioningState::Failed => write!(f, "Failed"),
            ProvisioningState::Deleting => write!(f, "Deleting"),
            ProvisioningState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Mirror state of a replication edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorState {
    Uninitialized,
    Mirrored,
    Broken,
}

/// Snapshot of the replication-status query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationStatus {
    pub mirror_state: MirrorState,

    /// Whether the last transfer completed without error
    pub healthy: bool,
}
