//! Resource backend trait definition

use crate::error::Result;
use crate::resource::{ProvisioningState, ReplicationStatus, ResourceHandle};
use crate::step::CreateStep;
use async_trait::async_trait;

/// Management-plane abstraction the sequencer drives.
///
/// Backends (the Azure NetApp Files implementation, the in-memory test
/// backend) implement this trait to provide the create/status/delete verbs
/// plus the two replication verbs.
///
/// Error contract: `provisioning_state` and `replication_status` must return
/// [`crate::error::CloudError::ResourceNotFound`] only when the management
/// plane definitively reports the resource gone. Every other failure is
/// treated as transient by the polling waiter.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Backend name for logging (e.g. "azure-netapp")
    fn name(&self) -> &str;

    /// Derive the handle a step would create, without calling the API.
    ///
    /// Handles must be deterministic so teardown can rebuild them from the
    /// plan alone; no state is persisted locally.
    fn resolve(&self, step: &CreateStep, parent: Option<&ResourceHandle>) -> ResourceHandle;

    /// Issue the create request for a step. `replication_source` carries the
    /// resolved source volume handle when the step is a data-protection
    /// volume. Returns the created resource's handle; provisioning continues
    /// asynchronously.
    async fn create(
        &self,
        step: &CreateStep,
        parent: Option<&ResourceHandle>,
        replication_source: Option<&ResourceHandle>,
    ) -> Result<ResourceHandle>;

    /// Query the provisioning state of a resource
    async fn provisioning_state(&self, handle: &ResourceHandle) -> Result<ProvisioningState>;

    /// Query the replication edge attached to a volume
    async fn replication_status(&self, handle: &ResourceHandle) -> Result<ReplicationStatus>;

    /// Issue the delete request. Fire-and-forget: completion is observed by
    /// polling `provisioning_state` until it reports not-found.
    async fn delete(&self, handle: &ResourceHandle) -> Result<()>;

    /// Authorize a replication edge on the source volume. Must run after the
    /// destination volume is ready and its replication edge is queryable.
    async fn authorize_replication(
        &self,
        source: &ResourceHandle,
        destination: &ResourceHandle,
    ) -> Result<()>;

    /// Remove the replication edge from a destination volume. Must precede
    /// deleting the volume itself.
    async fn remove_replication(&self, handle: &ResourceHandle) -> Result<()>;
}
