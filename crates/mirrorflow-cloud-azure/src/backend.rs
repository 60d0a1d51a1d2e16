//! Azure NetApp Files backend implementation

use crate::client::{ArmClient, AzureConfig};
use crate::error::AzureError;
use async_trait::async_trait;
use mirrorflow_cloud::{
    AccountSpec, CreateStep, MirrorState, PoolSpec, ProvisioningState, ReplicationStatus,
    ResourceBackend, ResourceHandle, Result, StepKind, VolumeSpec,
};
use serde_json::json;

/// NetApp Files resource backend over ARM
pub struct AzureNetAppBackend {
    client: ArmClient,
}

impl AzureNetAppBackend {
    pub fn new(config: AzureConfig) -> Self {
        Self {
            client: ArmClient::new(config),
        }
    }

    pub fn from_env() -> std::result::Result<Self, AzureError> {
        Ok(Self::new(AzureConfig::from_env()?))
    }
}

fn account_body(spec: &AccountSpec) -> serde_json::Value {
    json!({
        "location": spec.location,
        "properties": {},
    })
}

fn pool_body(spec: &PoolSpec) -> serde_json::Value {
    json!({
        "location": spec.location,
        "properties": {
            "size": spec.size_bytes,
            "serviceLevel": spec.service_level.to_string(),
        },
    })
}

fn volume_body(spec: &VolumeSpec, replication_source: Option<&ResourceHandle>) -> serde_json::Value {
    let rules: Vec<serde_json::Value> = spec
        .export_policy
        .iter()
        .map(|rule| {
            json!({
                "ruleIndex": rule.rule_index,
                "allowedClients": rule.allowed_clients,
                "unixReadOnly": rule.unix_read_only,
                "unixReadWrite": rule.unix_read_write,
                "nfsv3": rule.nfsv3,
                "nfsv41": rule.nfsv41,
            })
        })
        .collect();

    let mut properties = json!({
        "creationToken": spec.creation_token,
        "usageThreshold": spec.size_bytes,
        "subnetId": spec.subnet_id,
        "protocolTypes": [spec.protocol.to_string()],
        "exportPolicy": { "rules": rules },
    });

    if let (Some(replication), Some(source)) = (&spec.replication, replication_source) {
        properties["volumeType"] = json!("DataProtection");
        properties["dataProtection"] = json!({
            "replication": {
                "endpointType": "Dst",
                "replicationSchedule": replication.schedule.api_name(),
                "remoteVolumeResourceId": source.id,
                "remoteVolumeRegion": source.location,
            },
        });
    }

    json!({
        "location": spec.location,
        "properties": properties,
    })
}

#[async_trait]
impl ResourceBackend for AzureNetAppBackend {
    fn name(&self) -> &str {
        "azure-netapp"
    }

    fn resolve(&self, step: &CreateStep, parent: Option<&ResourceHandle>) -> ResourceHandle {
        let id = match (&step.kind, parent) {
            (StepKind::Account { .. }, _) => self.client.account_path(&step.name),
            (StepKind::Pool { .. }, Some(parent)) => {
                format!("{}/capacityPools/{}", parent.id, step.name)
            }
            (StepKind::Volume { .. }, Some(parent)) => {
                format!("{}/volumes/{}", parent.id, step.name)
            }
            // A validated plan always supplies the parent handle
            (_, None) => self.client.account_path(&step.name),
        };

        let handle = ResourceHandle::new(id, step.name.clone(), step.resource_kind())
            .with_location(step.location());
        if step.replication().is_some() {
            handle.with_replication()
        } else {
            handle
        }
    }

    async fn create(
        &self,
        step: &CreateStep,
        parent: Option<&ResourceHandle>,
        replication_source: Option<&ResourceHandle>,
    ) -> Result<ResourceHandle> {
        let handle = self.resolve(step, parent);
        let body = match &step.kind {
            StepKind::Account { spec } => account_body(spec),
            StepKind::Pool { spec, .. } => pool_body(spec),
            StepKind::Volume { spec, .. } => volume_body(spec, replication_source),
        };

        tracing::info!(backend = self.name(), resource = %handle, "creating");
        self.client.put_resource(&handle.id, &body).await?;
        Ok(handle)
    }

    async fn provisioning_state(&self, handle: &ResourceHandle) -> Result<ProvisioningState> {
        let resource = self.client.get_resource(&handle.id).await?;
        Ok(resource
            .properties
            .provisioning_state
            .as_deref()
            .map(ProvisioningState::parse)
            .unwrap_or(ProvisioningState::Unknown))
    }

    async fn replication_status(&self, handle: &ResourceHandle) -> Result<ReplicationStatus> {
        let status = self.client.get_replication_status(&handle.id).await?;
        let mirror_state = match status.mirror_state.as_deref() {
            Some("Mirrored") => MirrorState::Mirrored,
            Some("Broken") => MirrorState::Broken,
            _ => MirrorState::Uninitialized,
        };
        Ok(ReplicationStatus {
            mirror_state,
            healthy: status.healthy.unwrap_or(false),
        })
    }

    async fn delete(&self, handle: &ResourceHandle) -> Result<()> {
        tracing::info!(backend = self.name(), resource = %handle, "deleting");
        self.client.delete_resource(&handle.id).await?;
        Ok(())
    }

    async fn authorize_replication(
        &self,
        source: &ResourceHandle,
        destination: &ResourceHandle,
    ) -> Result<()> {
        let body = json!({ "remoteVolumeResourceId": destination.id });
        self.client
            .post_action(&source.id, "authorizeReplication", Some(&body))
            .await?;
        Ok(())
    }

    async fn remove_replication(&self, handle: &ResourceHandle) -> Result<()> {
        self.client
            .post_action(&handle.id, "deleteReplication", None)
            .await?;
        Ok(())
    }
}
