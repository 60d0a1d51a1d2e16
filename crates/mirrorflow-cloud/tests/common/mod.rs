//! In-memory backend for sequencer and waiter tests
//!
//! Readiness, edge visibility, and deletion latency are scripted per
//! resource as poll countdowns, and every backend call is recorded so tests
//! can assert on ordering.

use async_trait::async_trait;
use mirrorflow_cloud::resource::{MIN_POOL_SIZE, MIN_VOLUME_SIZE};
use mirrorflow_cloud::{
    AccountSpec, CloudError, CreateStep, ExportPolicyRule, MirrorState, Plan, PoolSpec, Protocol,
    ProvisioningState, ReplicationSchedule, ReplicationSpec, ReplicationStatus, ResourceBackend,
    ResourceHandle, Result, ServiceLevel, VolumeSpec, WaitOptions,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        name: String,
        parent: Option<String>,
        replication_source: Option<String>,
    },
    Status(String),
    Replication(String),
    Delete(String),
    Authorize {
        source: String,
        destination: String,
    },
    RemoveReplication(String),
}

#[derive(Debug, Default)]
struct MockResource {
    replicated: bool,
    /// Status polls answering `Creating` before the first `Succeeded`
    ready_countdown: u32,
    /// Replication polls answering not-found before the edge is visible
    edge_countdown: u32,
    /// Replication polls answering `Uninitialized` before `Mirrored`
    mirror_countdown: u32,
    /// Status polls answering transient errors before a real answer
    status_fail_countdown: u32,
    deleted: bool,
    /// Status polls answering `Deleting` after deletion before not-found
    gone_countdown: u32,
    edge_removed: bool,
    /// Replication polls answering present after removal before not-found
    edge_gone_countdown: u32,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<Call>,
    resources: HashMap<String, MockResource>,
    ready_after: HashMap<String, u32>,
    edge_after: HashMap<String, u32>,
    mirrored_after: HashMap<String, u32>,
    status_fails: HashMap<String, u32>,
    gone_after: HashMap<String, u32>,
    edge_gone_after: HashMap<String, u32>,
    fail_create: Option<String>,
    fail_delete: Option<String>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource reports `Creating` for the first `polls` status queries
    pub fn set_ready_after(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .ready_after
            .insert(name.to_string(), polls);
    }

    /// Replication edge is not queryable for the first `polls` queries
    pub fn set_edge_visible_after(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .edge_after
            .insert(name.to_string(), polls);
    }

    /// Replication edge answers `Uninitialized` for the first `polls`
    /// queries before reporting `Mirrored`
    pub fn set_mirrored_after(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .mirrored_after
            .insert(name.to_string(), polls);
    }

    /// First `polls` status queries fail with a transient error
    pub fn set_status_failures(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .status_fails
            .insert(name.to_string(), polls);
    }

    /// After deletion, resource reports `Deleting` for `polls` queries
    /// before going not-found
    pub fn set_gone_after(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .gone_after
            .insert(name.to_string(), polls);
    }

    /// After edge removal, the replication query stays answerable for
    /// `polls` queries before going not-found
    pub fn set_edge_gone_after(&self, name: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .edge_gone_after
            .insert(name.to_string(), polls);
    }

    pub fn fail_create_of(&self, name: &str) {
        self.state.lock().unwrap().fail_create = Some(name.to_string());
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.state.lock().unwrap().fail_delete = Some(name.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn status_polls(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Status(n) if n == name))
            .count()
    }

    pub fn replication_polls(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Replication(n) if n == name))
            .count()
    }

    /// Clear the call log, keeping resource state
    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl ResourceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn resolve(&self, step: &CreateStep, parent: Option<&ResourceHandle>) -> ResourceHandle {
        let id = match parent {
            Some(parent) => format!("{}/{}", parent.id, step.name),
            None => format!("/mock/{}", step.name),
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
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            name: step.name.clone(),
            parent: parent.map(|p| p.name.clone()),
            replication_source: replication_source.map(|s| s.name.clone()),
        });

        if state.fail_create.as_deref() == Some(step.name.as_str()) {
            return Err(CloudError::ApiError(format!(
                "injected create failure for {}",
                step.name
            )));
        }

        let resource = MockResource {
            replicated: step.replication().is_some(),
            ready_countdown: state.ready_after.get(&step.name).copied().unwrap_or(0),
            edge_countdown: state.edge_after.get(&step.name).copied().unwrap_or(0),
            mirror_countdown: state.mirrored_after.get(&step.name).copied().unwrap_or(0),
            status_fail_countdown: state.status_fails.get(&step.name).copied().unwrap_or(0),
            gone_countdown: state.gone_after.get(&step.name).copied().unwrap_or(0),
            edge_gone_countdown: state.edge_gone_after.get(&step.name).copied().unwrap_or(0),
            ..Default::default()
        };
        state.resources.insert(step.name.clone(), resource);
        Ok(handle)
    }

    async fn provisioning_state(&self, handle: &ResourceHandle) -> Result<ProvisioningState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Status(handle.name.clone()));

        let Some(resource) = state.resources.get_mut(&handle.name) else {
            return Err(CloudError::ResourceNotFound(handle.name.clone()));
        };

        if resource.status_fail_countdown > 0 {
            resource.status_fail_countdown -= 1;
            return Err(CloudError::ApiError("injected transient failure".to_string()));
        }

        if resource.deleted {
            if resource.gone_countdown == 0 {
                return Err(CloudError::ResourceNotFound(handle.name.clone()));
            }
            resource.gone_countdown -= 1;
            return Ok(ProvisioningState::Deleting);
        }

        if resource.ready_countdown > 0 {
            resource.ready_countdown = resource.ready_countdown.saturating_sub(1);
            return Ok(ProvisioningState::Creating);
        }
        Ok(ProvisioningState::Succeeded)
    }

    async fn replication_status(&self, handle: &ResourceHandle) -> Result<ReplicationStatus> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Replication(handle.name.clone()));

        let Some(resource) = state.resources.get_mut(&handle.name) else {
            return Err(CloudError::ResourceNotFound(handle.name.clone()));
        };

        if !resource.replicated {
            return Err(CloudError::ResourceNotFound(format!(
                "no replication on {}",
                handle.name
            )));
        }

        if resource.edge_removed {
            if resource.edge_gone_countdown == 0 {
                return Err(CloudError::ResourceNotFound(format!(
                    "replication removed from {}",
                    handle.name
                )));
            }
            resource.edge_gone_countdown -= 1;
            return Ok(ReplicationStatus {
                mirror_state: MirrorState::Broken,
                healthy: false,
            });
        }

        if resource.edge_countdown > 0 {
            resource.edge_countdown -= 1;
            return Err(CloudError::ResourceNotFound(format!(
                "replication not yet visible on {}",
                handle.name
            )));
        }

        if resource.mirror_countdown > 0 {
            resource.mirror_countdown -= 1;
            return Ok(ReplicationStatus {
                mirror_state: MirrorState::Uninitialized,
                healthy: false,
            });
        }

        Ok(ReplicationStatus {
            mirror_state: MirrorState::Mirrored,
            healthy: true,
        })
    }

    async fn delete(&self, handle: &ResourceHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(handle.name.clone()));

        if state.fail_delete.as_deref() == Some(handle.name.as_str()) {
            return Err(CloudError::ApiError(format!(
                "injected delete failure for {}",
                handle.name
            )));
        }

        match state.resources.get_mut(&handle.name) {
            Some(resource) => {
                resource.deleted = true;
                Ok(())
            }
            None => Err(CloudError::ResourceNotFound(handle.name.clone())),
        }
    }

    async fn authorize_replication(
        &self,
        source: &ResourceHandle,
        destination: &ResourceHandle,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Authorize {
            source: source.name.clone(),
            destination: destination.name.clone(),
        });
        Ok(())
    }

    async fn remove_replication(&self, handle: &ResourceHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RemoveReplication(handle.name.clone()));

        match state.resources.get_mut(&handle.name) {
            Some(resource) => {
                resource.edge_removed = true;
                Ok(())
            }
            None => Err(CloudError::ResourceNotFound(handle.name.clone())),
        }
    }
}

/// Build the standard two-region plan used across the tests:
/// account A → pool P → volume V1, account B → pool Q →
/// data-protection volume V2 replicating from V1.
#[allow(dead_code)]
pub fn cross_region_plan() -> Plan {
    let pool = |location: &str, level| PoolSpec {
        location: location.to_string(),
        size_bytes: MIN_POOL_SIZE,
        service_level: level,
    };
    let volume = |location: &str, token: &str, replication| VolumeSpec {
        location: location.to_string(),
        creation_token: token.to_string(),
        size_bytes: MIN_VOLUME_SIZE,
        protocol: Protocol::Nfsv3,
        subnet_id: "/subnets/default".to_string(),
        export_policy: vec![ExportPolicyRule::read_write("0.0.0.0/0", Protocol::Nfsv3)],
        replication,
    };

    Plan::new(vec![
        CreateStep::account(
            "acct-primary",
            AccountSpec {
                location: "westus2".to_string(),
            },
        ),
        CreateStep::pool("pool-primary", 0, pool("westus2", ServiceLevel::Premium)),
        CreateStep::volume("vol-source", 1, volume("westus2", "vol-source", None)),
        CreateStep::account(
            "acct-secondary",
            AccountSpec {
                location: "eastus2".to_string(),
            },
        ),
        CreateStep::pool("pool-secondary", 3, pool("eastus2", ServiceLevel::Standard)),
        CreateStep::volume(
            "vol-destination",
            4,
            volume(
                "eastus2",
                "vol-destination",
                Some(ReplicationSpec {
                    source: 2,
                    schedule: ReplicationSchedule::Hourly,
                }),
            ),
        ),
    ])
}

/// Wait options with a zero interval so tests run instantly
#[allow(dead_code)]
pub fn fast_wait(max_retries: u32) -> WaitOptions {
    WaitOptions::default()
        .with_interval(std::time::Duration::ZERO)
        .with_max_retries(max_retries)
}
