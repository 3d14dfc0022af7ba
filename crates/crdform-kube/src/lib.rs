//! Kubernetes integration for crdform
//!
//! This crate talks to the API server on behalf of typed CRD resources:
//!
//! - **Apply**: server-side apply under a field manager, with conflicts
//!   reported per field and owner
//! - **Read**: fetch objects and project them back into typed state
//! - **Delete**: background propagation, optionally waiting for removal
//! - **Offline mode**: every network operation refused before any I/O
//!
//! The [`ClusterBackend`] trait is the seam between the lifecycle logic and
//! the cluster. [`DynamicBackend`] uses kube-rs; [`MockCluster`] keeps
//! everything in memory for tests.

pub mod apply;
pub mod backend;
pub mod convert;
pub mod data_source;
pub mod error;
pub mod offline;
pub mod provider;
pub mod read;
pub mod resource;

pub use apply::{ApplyEngine, ApplyRequest};
pub use backend::{
    ClusterBackend, DynamicBackend, MockCluster, MockFailure, OperationCounts,
    parse_apply_conflicts,
};
pub use convert::{from_dynamic_object, to_dynamic_object};
pub use data_source::{CrdDataSource, ManifestDataSource};
pub use error::{FieldConflict, KubeError, Operation, Result};
pub use offline::OfflineGate;
pub use provider::Provider;
pub use read::ReadProjector;
pub use resource::{CrdResource, DeleteOutcome, ResourceState};
