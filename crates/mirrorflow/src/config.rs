//! Deployment file handling
//!
//! A deployment is a YAML document describing the primary and secondary
//! sides of a cross-region replication pair. The file is turned into a
//! validated [`Plan`] before anything touches the management plane.

use mirrorflow_cloud::{
    AccountSpec, CreateStep, ExportPolicyRule, Plan, PoolSpec, Protocol, ReplicationSchedule,
    ReplicationSpec, ServiceLevel, VolumeSpec,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Deployment file not found (tried {0:?}; set MIRRORFLOW_CONFIG or pass --file)")]
    NotFound(Vec<PathBuf>),

    #[error("Invalid deployment: {0}")]
    Invalid(String),

    #[error("Plan error: {0}")]
    Plan(#[from] mirrorflow_cloud::CloudError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const CONFIG_CANDIDATES: &[&str] = &["mirrorflow.yaml", "mirrorflow.yml"];

/// One side (region) of the replication pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideConfig {
    pub region: String,
    pub account: String,
    pub pool: String,
    pub pool_size_bytes: u64,
    pub service_level: ServiceLevel,
    pub volume: String,
    pub volume_size_bytes: u64,
    pub subnet_id: String,
}

/// Full deployment description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Tear the deployment back down after provisioning completes
    #[serde(default)]
    pub cleanup: bool,

    /// CIDR range allowed to mount the volumes
    pub allowed_clients: String,

    pub protocol: Protocol,

    pub replication_schedule: ReplicationSchedule,

    pub primary: SideConfig,
    pub secondary: SideConfig,
}

impl DeploymentConfig {
    /// Locate the deployment file: explicit path, then `MIRRORFLOW_CONFIG`,
    /// then well-known names in the working directory
    pub fn find(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("MIRRORFLOW_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let mut tried = Vec::new();
        for candidate in CONFIG_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
            tried.push(path);
        }
        Err(ConfigError::NotFound(tried))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DeploymentConfig = serde_yaml::from_str(&content)?;
        config.validate_edges()?;
        Ok(config)
    }

    /// Range/enum checks on the free-form inputs; structural checks happen
    /// in [`Plan::validate`]
    fn validate_edges(&self) -> Result<()> {
        validate_cidr(&self.allowed_clients)?;
        for side in [&self.primary, &self.secondary] {
            if side.region.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "account {} has an empty region",
                    side.account
                )));
            }
        }
        if self.primary.region == self.secondary.region {
            return Err(ConfigError::Invalid(
                "primary and secondary must be in different regions".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the six-step create sequence: primary account → pool → volume,
    /// secondary account → pool → data-protection volume replicating from
    /// the primary volume
    pub fn to_plan(&self) -> Result<Plan> {
        let export_policy = vec![ExportPolicyRule::read_write(
            self.allowed_clients.clone(),
            self.protocol,
        )];

        let side_steps = |side: &SideConfig, base: usize, replication| {
            vec![
                CreateStep::account(
                    side.account.clone(),
                    AccountSpec {
                        location: side.region.clone(),
                    },
                ),
                CreateStep::pool(
                    side.pool.clone(),
                    base,
                    PoolSpec {
                        location: side.region.clone(),
                        size_bytes: side.pool_size_bytes,
                        service_level: side.service_level,
                    },
                ),
                CreateStep::volume(
                    side.volume.clone(),
                    base + 1,
                    VolumeSpec {
                        location: side.region.clone(),
                        creation_token: side.volume.clone(),
                        size_bytes: side.volume_size_bytes,
                        protocol: self.protocol,
                        subnet_id: side.subnet_id.clone(),
                        export_policy: export_policy.clone(),
                        replication,
                    },
                ),
            ]
        };

        let mut steps = side_steps(&self.primary, 0, None);
        steps.extend(side_steps(
            &self.secondary,
            3,
            Some(ReplicationSpec {
                source: 2,
                schedule: self.replication_schedule,
            }),
        ));

        let plan = Plan::new(steps);
        plan.validate()?;
        Ok(plan)
    }
}

fn validate_cidr(cidr: &str) -> Result<()> {
    let invalid = || ConfigError::Invalid(format!("allowed_clients is not a CIDR range: {cidr}"));

    let (address, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    address
        .parse::<std::net::Ipv4Addr>()
        .map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
cleanup: false
allowed_clients: "10.7.0.0/16"
protocol: "NFSv3"
replication_schedule: "hourly"
primary:
  region: westus2
  account: acct-primary
  pool: pool-primary
  pool_size_bytes: 4398046511104
  service_level: Premium
  volume: vol-source
  volume_size_bytes: 107374182400
  subnet_id: "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/anf"
secondary:
  region: eastus2
  account: acct-secondary
  pool: pool-secondary
  pool_size_bytes: 4398046511104
  service_level: Standard
  volume: vol-destination
  volume_size_bytes: 107374182400
  subnet_id: "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet2/subnets/anf"
"#
    }

    #[test]
    fn test_parse_and_plan() {
        let config: DeploymentConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        config.validate_edges().unwrap();

        let plan = config.to_plan().unwrap();
        assert_eq!(plan.len(), 6);

        let summary = plan.summary();
        assert_eq!(summary.accounts, 2);
        assert_eq!(summary.pools, 2);
        assert_eq!(summary.volumes, 2);
        assert_eq!(summary.replications, 1);

        // The destination volume replicates from the primary volume step
        let replication = plan.steps[5].replication().unwrap();
        assert_eq!(replication.source, 2);
    }

    #[test]
    fn test_same_region_rejected() {
        let mut config: DeploymentConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        config.secondary.region = config.primary.region.clone();
        assert!(config.validate_edges().is_err());
    }

    #[test]
    fn test_bad_cidr_rejected() {
        assert!(validate_cidr("10.7.0.0/16").is_ok());
        assert!(validate_cidr("10.7.0.0").is_err());
        assert!(validate_cidr("10.7.0.0/64").is_err());
        assert!(validate_cidr("clients/16").is_err());
    }

    #[test]
    fn test_pool_size_out_of_range_rejected_by_plan() {
        let mut config: DeploymentConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        config.primary.pool_size_bytes = 1;
        assert!(config.to_plan().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrorflow.yaml");
        std::fs::write(&path, sample_yaml()).unwrap();

        let config = DeploymentConfig::load(&path).unwrap();
        assert_eq!(config.primary.account, "acct-primary");
        assert!(!config.cleanup);
    }
}
