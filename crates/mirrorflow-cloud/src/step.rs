//! Provisioning plan as data
//!
//! The fixed create sequence is represented as an ordered list of typed
//! steps with index-based parent references, so the sequencer can be
//! exercised against any [`crate::backend::ResourceBackend`].

use crate::error::{CloudError, Result};
use crate::resource::{AccountSpec, PoolSpec, ReplicationSpec, ResourceKind, VolumeSpec};
use serde::{Deserialize, Serialize};

/// One create request in a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStep {
    /// Name the resource is created under
    pub name: String,

    #[serde(flatten)]
    pub kind: StepKind,
}

/// Kind-specific payload of a step. Pools and volumes reference their
/// containing resource by the index of an earlier step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    Account { spec: AccountSpec },
    Pool { parent: usize, spec: PoolSpec },
    Volume { parent: usize, spec: VolumeSpec },
}

impl CreateStep {
    pub fn account(name: impl Into<String>, spec: AccountSpec) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Account { spec },
        }
    }

    pub fn pool(name: impl Into<String>, parent: usize, spec: PoolSpec) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Pool { parent, spec },
        }
    }

    pub fn volume(name: impl Into<String>, parent: usize, spec: VolumeSpec) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Volume { parent, spec },
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        match &self.kind {
            StepKind::Account { .. } => ResourceKind::Account,
            StepKind::Pool { .. } => ResourceKind::Pool,
            StepKind::Volume { .. } => ResourceKind::Volume,
        }
    }

    /// Index of the containing step, if any
    pub fn parent(&self) -> Option<usize> {
        match &self.kind {
            StepKind::Account { .. } => None,
            StepKind::Pool { parent, .. } | StepKind::Volume { parent, .. } => Some(*parent),
        }
    }

    /// Replication descriptor, for data-protection volume steps
    pub fn replication(&self) -> Option<&ReplicationSpec> {
        match &self.kind {
            StepKind::Volume { spec, .. } => spec.replication.as_ref(),
            _ => None,
        }
    }

    /// Region the step creates its resource in
    pub fn location(&self) -> &str {
        match &self.kind {
            StepKind::Account { spec } => &spec.location,
            StepKind::Pool { spec, .. } => &spec.location,
            StepKind::Volume { spec, .. } => &spec.location,
        }
    }
}

/// Ordered create sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<CreateStep>,
}

impl Plan {
    pub fn new(steps: Vec<CreateStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check structural invariants: parents must be earlier steps of the
    /// containing kind, replication sources must be earlier volume steps,
    /// and every property bag must pass its range checks.
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(parent) = step.parent() {
                if parent >= index {
                    return Err(CloudError::InvalidPlan(format!(
                        "step {} ({}) references parent step {} which does not precede it",
                        index, step.name, parent
                    )));
                }
                let expected = step.resource_kind().parent_kind();
                let actual = self.steps[parent].resource_kind();
                if expected != Some(actual) {
                    return Err(CloudError::InvalidPlan(format!(
                        "step {} ({}) expects a {} parent, step {} is a {}",
                        index,
                        step.name,
                        expected.map(|k| k.to_string()).unwrap_or_default(),
                        parent,
                        actual
                    )));
                }
            }

            match &step.kind {
                StepKind::Account { .. } => {}
                StepKind::Pool { spec, .. } => spec.validate()?,
                StepKind::Volume { spec, .. } => {
                    spec.validate()?;
                    if let Some(replication) = &spec.replication {
                        if replication.source >= index {
                            return Err(CloudError::InvalidPlan(format!(
                                "step {} ({}) replicates from step {} which does not precede it",
                                index, step.name, replication.source
                            )));
                        }
                        if self.steps[replication.source].resource_kind() != ResourceKind::Volume {
                            return Err(CloudError::InvalidPlan(format!(
                                "step {} ({}) replicates from step {} which is not a volume",
                                index, step.name, replication.source
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Summary line for user-facing output
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for step in &self.steps {
            match step.resource_kind() {
                ResourceKind::Account => summary.accounts += 1,
                ResourceKind::Pool => summary.pools += 1,
                ResourceKind::Volume => summary.volumes += 1,
            }
            if step.replication().is_some() {
                summary.replications += 1;
            }
        }
        summary
    }
}

/// Counts of planned resources by kind
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanSummary {
    pub accounts: usize,
    pub pools: usize,
    pub volumes: usize,
    pub replications: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} accounts, {} pools, {} volumes, {} replication links",
            self.accounts, self.pools, self.volumes, self.replications
        )
    }
}
