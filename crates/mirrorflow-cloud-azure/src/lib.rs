//! Azure NetApp Files backend for MirrorFlow
//!
//! Implements the `ResourceBackend` trait over the Azure Resource Manager
//! REST API, covering NetApp accounts, capacity pools, volumes, and
//! cross-region replication edges.
//!
//! # Requirements
//!
//! - `AZURE_SUBSCRIPTION_ID`, `AZURE_RESOURCE_GROUP`, `AZURE_MGMT_TOKEN`
//!   env vars. The token comes from whatever login flow the operator uses
//!   (e.g. `az account get-access-token --query accessToken`).
//!
//! # Example
//!
//! ```ignore
//! use mirrorflow_cloud_azure::AzureNetAppBackend;
//! use mirrorflow_cloud::Sequencer;
//!
//! let backend = AzureNetAppBackend::from_env()?;
//! let sequencer = Sequencer::new(backend);
//! let handles = sequencer.provision(&plan).await?;
//! ```

pub mod backend;
pub mod client;
pub mod error;

pub use backend::AzureNetAppBackend;
pub use client::{ArmClient, ArmReplicationStatus, ArmResource, AzureConfig};
pub use error::{AzureError, Result};
