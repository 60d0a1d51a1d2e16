//! Ordered provisioning and teardown
//!
//! The sequencer executes a [`Plan`] strictly in order against a
//! [`ResourceBackend`]: create, poll until ready, next step. Teardown walks
//! the handle registry in reverse, detaching replication edges before the
//! volumes that carry them. There is no parallelism and no rollback; a hard
//! failure aborts the remainder of the sequence and leaves everything
//! created so far in place.

use crate::backend::ResourceBackend;
use crate::error::{CloudError, Result};
use crate::resource::ResourceHandle;
use crate::step::Plan;
use crate::waiter::{WaitOptions, wait_until_absent, wait_until_ready};
use thiserror::Error;

/// A provisioning sequence that stopped early.
///
/// Carries the handles of every resource created before the failure so the
/// caller can inspect or tear down the partial deployment; nothing is
/// rolled back automatically.
#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("plan validation failed: {0}")]
    Plan(#[source] CloudError),

    #[error("step {step} ({name}) failed: {source}")]
    Step {
        step: usize,
        name: String,
        #[source]
        source: CloudError,
        completed: Vec<ResourceHandle>,
    },

    #[error("authorizing replication onto {destination} failed: {source}")]
    Authorize {
        destination: String,
        #[source]
        source: CloudError,
        completed: Vec<ResourceHandle>,
    },
}

impl SequenceError {
    /// Handles created before the sequence aborted, in creation order
    pub fn completed(&self) -> &[ResourceHandle] {
        match self {
            SequenceError::Plan(_) => &[],
            SequenceError::Step { completed, .. } => completed,
            SequenceError::Authorize { completed, .. } => completed,
        }
    }
}

/// Drives a plan against a backend, one operation at a time
pub struct Sequencer<B> {
    backend: B,
    wait: WaitOptions,
}

impl<B: ResourceBackend> Sequencer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            wait: WaitOptions::default(),
        }
    }

    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rebuild the handle registry for a plan without touching the API.
    ///
    /// Teardown and status checks use this; all actual state lives on the
    /// management plane and is rediscovered by polling.
    pub fn resolve_all(&self, plan: &Plan) -> Result<Vec<ResourceHandle>> {
        plan.validate()?;
        let mut handles: Vec<ResourceHandle> = Vec::with_capacity(plan.len());
        for step in &plan.steps {
            let parent = step.parent().map(|index| handles[index].clone());
            handles.push(self.backend.resolve(step, parent.as_ref()));
        }
        Ok(handles)
    }

    /// Execute the plan's create steps strictly in order.
    ///
    /// Each step is created and then polled until ready before the next step
    /// starts. A readiness timeout is logged and execution continues; a
    /// create failure aborts immediately, returning the handles created so
    /// far inside the error.
    pub async fn create_ordered(
        &self,
        plan: &Plan,
    ) -> std::result::Result<Vec<ResourceHandle>, SequenceError> {
        plan.validate().map_err(SequenceError::Plan)?;

        let mut handles: Vec<ResourceHandle> = Vec::with_capacity(plan.len());
        for (index, step) in plan.steps.iter().enumerate() {
            let parent = step.parent().map(|i| handles[i].clone());
            let replication_source = step.replication().map(|r| handles[r.source].clone());

            tracing::info!(
                step = index,
                kind = %step.resource_kind(),
                name = %step.name,
                "creating resource"
            );

            let handle = self
                .backend
                .create(step, parent.as_ref(), replication_source.as_ref())
                .await
                .map_err(|source| SequenceError::Step {
                    step: index,
                    name: step.name.clone(),
                    source,
                    completed: handles.clone(),
                })?;

            let mut wait = self.wait.clone();
            wait.check_replication = step.replication().is_some();
            if wait_until_ready(&self.backend, &handle, &wait).await.is_timed_out() {
                tracing::warn!(resource = %handle, "proceeding without readiness confirmation");
            }

            handles.push(handle);
        }

        Ok(handles)
    }

    /// Authorize every replication edge in the plan on its source volume.
    ///
    /// Must run after [`Sequencer::create_ordered`]: authorization requires
    /// the destination volume to be ready with its edge queryable.
    pub async fn authorize(
        &self,
        plan: &Plan,
        handles: &[ResourceHandle],
    ) -> std::result::Result<(), SequenceError> {
        for (index, step) in plan.steps.iter().enumerate() {
            let Some(replication) = step.replication() else {
                continue;
            };
            let source = &handles[replication.source];
            let destination = &handles[index];

            tracing::info!(%source, %destination, "authorizing replication");
            self.backend
                .authorize_replication(source, destination)
                .await
                .map_err(|e| SequenceError::Authorize {
                    destination: destination.name.clone(),
                    source: e,
                    completed: handles.to_vec(),
                })?;

            let wait = self.wait.clone().mirrored();
            if wait_until_ready(&self.backend, destination, &wait).await.is_timed_out() {
                tracing::warn!(resource = %destination, "replication not confirmed mirrored");
            }
        }
        Ok(())
    }

    /// Full provisioning pass: ordered creation, then replication
    /// authorization.
    pub async fn provision(
        &self,
        plan: &Plan,
    ) -> std::result::Result<Vec<ResourceHandle>, SequenceError> {
        let handles = self.create_ordered(plan).await?;
        self.authorize(plan, &handles).await?;
        Ok(handles)
    }

    /// Delete every resource in strict reverse-creation order.
    ///
    /// Replication-destination volumes have their edge removed (and polled
    /// to absence) before the volume delete goes out. A failed delete call
    /// aborts the whole teardown, leaving the remaining resources live.
    pub async fn teardown_ordered(&self, handles: &[ResourceHandle]) -> Result<()> {
        for handle in handles.iter().rev() {
            if handle.replicated {
                tracing::info!(resource = %handle, "removing replication edge");
                self.backend.remove_replication(handle).await?;

                let wait = self.wait.clone().replication();
                if wait_until_absent(&self.backend, handle, &wait).await.is_timed_out() {
                    tracing::warn!(resource = %handle, "replication edge not confirmed gone");
                }
            }

            tracing::info!(resource = %handle, "deleting resource");
            self.backend.delete(handle).await?;

            let mut wait = self.wait.clone();
            wait.check_replication = false;
            if wait_until_absent(&self.backend, handle, &wait).await.is_timed_out() {
                tracing::warn!(resource = %handle, "deletion not confirmed, continuing");
            }
        }
        Ok(())
    }
}
