//! MirrorFlow core
//!
//! Resource model, backend abstraction, and provisioning sequencer for
//! cross-region volume replication setups: two storage accounts, two
//! capacity pools, a source volume and a data-protection destination volume
//! joined by a replication edge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 MirrorFlow CLI                   │
//! │            (mirrorflow up/down/status)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               mirrorflow-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        Provisioning Sequencer             │   │
//! │  │  plan → create → poll → authorize         │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ResourceBackend { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────────────────┬─────────────────────────────┘
//!                     │
//!           ┌─────────▼─────────┐
//!           │  azure-netapp     │
//!           │    backend        │
//!           └───────────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod resource;
pub mod sequencer;
pub mod step;
pub mod waiter;

// Re-exports
pub use backend::ResourceBackend;
pub use error::{CloudError, Result};
pub use resource::{
    AccountSpec, ExportPolicyRule, MirrorState, PoolSpec, Protocol, ProvisioningState,
    ReplicationSchedule, ReplicationSpec, ReplicationStatus, ResourceHandle, ResourceKind,
    ServiceLevel, VolumeSpec,
};
pub use sequencer::{SequenceError, Sequencer};
pub use step::{CreateStep, Plan, PlanSummary, StepKind};
pub use waiter::{WaitOptions, WaitOutcome, wait_until_absent, wait_until_ready};
