//! Azure Resource Manager REST client
//!
//! Thin wrapper over the management endpoint with bearer-token auth.
//! Acquiring the token is out of scope here; it is handed in via the
//! environment (e.g. `az account get-access-token`).

use crate::error::{AzureError, Result};
use serde::Deserialize;

const ARM_API_BASE: &str = "https://management.azure.com";
const NETAPP_API_VERSION: &str = "2023-05-01";

/// Configuration for the ARM client
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub subscription_id: String,
    pub resource_group: String,
    pub token: String,
}

impl AzureConfig {
    /// Create AzureConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let subscription_id = std::env::var("AZURE_SUBSCRIPTION_ID")
            .map_err(|_| AzureError::MissingEnvVar("AZURE_SUBSCRIPTION_ID".to_string()))?;
        let resource_group = std::env::var("AZURE_RESOURCE_GROUP")
            .map_err(|_| AzureError::MissingEnvVar("AZURE_RESOURCE_GROUP".to_string()))?;
        let token = std::env::var("AZURE_MGMT_TOKEN")
            .map_err(|_| AzureError::MissingEnvVar("AZURE_MGMT_TOKEN".to_string()))?;

        Ok(Self {
            subscription_id,
            resource_group,
            token,
        })
    }
}

/// ARM resource envelope, reduced to what the sequencer polls
#[derive(Debug, Clone, Deserialize)]
pub struct ArmResource {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ArmProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmProperties {
    pub provisioning_state: Option<String>,
}

/// Body of the `replicationStatus` action
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmReplicationStatus {
    pub mirror_state: Option<String>,
    pub healthy: Option<bool>,
    pub error_message: Option<String>,
}

/// Client for the NetApp resource provider under ARM
pub struct ArmClient {
    http: reqwest::Client,
    config: AzureConfig,
}

impl ArmClient {
    pub fn new(config: AzureConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Root ARM path for a top-level account name
    pub fn account_path(&self, account: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/netAppAccounts/{}",
            self.config.subscription_id, self.config.resource_group, account
        )
    }

    fn url(&self, resource_id: &str) -> String {
        format!(
            "{}{}?api-version={}",
            ARM_API_BASE, resource_id, NETAPP_API_VERSION
        )
    }

    fn action_url(&self, resource_id: &str, action: &str) -> String {
        format!(
            "{}{}/{}?api-version={}",
            ARM_API_BASE, resource_id, action, NETAPP_API_VERSION
        )
    }

    async fn check(&self, response: reqwest::Response, resource_id: &str) -> Result<String> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AzureError::NotFound(resource_id.to_string()));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AzureError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// PUT the resource, starting asynchronous provisioning
    pub async fn put_resource(
        &self,
        resource_id: &str,
        body: &serde_json::Value,
    ) -> Result<ArmResource> {
        tracing::debug!(resource_id, "PUT resource");
        let response = self
            .http
            .put(self.url(resource_id))
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await?;
        let body = self.check(response, resource_id).await?;
        // Async creates may answer 202 with an empty body
        if body.trim().is_empty() {
            return Ok(ArmResource {
                id: None,
                name: None,
                properties: ArmProperties::default(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// GET the resource envelope (provisioning state lives in properties)
    pub async fn get_resource(&self, resource_id: &str) -> Result<ArmResource> {
        let response = self
            .http
            .get(self.url(resource_id))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body = self.check(response, resource_id).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// DELETE the resource; completion is observed by polling GET
    pub async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        tracing::debug!(resource_id, "DELETE resource");
        let response = self
            .http
            .delete(self.url(resource_id))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        self.check(response, resource_id).await?;
        Ok(())
    }

    /// POST a resource action (authorizeReplication, deleteReplication)
    pub async fn post_action(
        &self,
        resource_id: &str,
        action: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        tracing::debug!(resource_id, action, "POST action");
        let mut request = self
            .http
            .post(self.action_url(resource_id, action))
            .bearer_auth(&self.config.token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.check(response, resource_id).await?;
        Ok(())
    }

    /// GET the replication status of a volume.
    ///
    /// ARM answers `400 VolumeReplicationMissing` rather than 404 when the
    /// volume exists but carries no replication; both mean "edge absent"
    /// to the caller.
    pub async fn get_replication_status(&self, resource_id: &str) -> Result<ArmReplicationStatus> {
        let response = self
            .http
            .get(self.action_url(resource_id, "replicationStatus"))
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AzureError::NotFound(resource_id.to_string()));
        }
        let body = response.text().await?;
        if !status.is_success() {
            if body.contains("VolumeReplicationMissing") {
                return Err(AzureError::NotFound(format!(
                    "no replication on {resource_id}"
                )));
            }
            return Err(AzureError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
