//! Backends that talk to a Kubernetes API server
//!
//! - **Dynamic** (default): kube-rs client against a real cluster
//! - **Mock**: in-memory server-side apply, for tests without a cluster
//!
//! Every call is a single round trip. Backends never cache objects.

mod conflict;
mod dynamic;
mod mock;

pub use conflict::parse_apply_conflicts;
pub use dynamic::DynamicBackend;
pub use mock::{MockCluster, MockFailure, OperationCounts};

use async_trait::async_trait;

use crate::apply::ApplyRequest;
use crate::error::{KubeError, Result};
use crdform_core::{ResourceCoordinates, UnstructuredDocument};

/// The API-server seam
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    /// Fetch the current object
    async fn get(&self, coords: &ResourceCoordinates) -> Result<UnstructuredDocument>;

    /// Server-side apply `request` and return the object the server stored
    async fn apply(
        &self,
        coords: &ResourceCoordinates,
        request: &ApplyRequest,
    ) -> Result<UnstructuredDocument>;

    /// Delete the object with background propagation
    async fn delete(&self, coords: &ResourceCoordinates) -> Result<()>;

    /// Check if the object exists
    async fn exists(&self, coords: &ResourceCoordinates) -> Result<bool> {
        match self.get(coords).await {
            Ok(_) => Ok(true),
            Err(KubeError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
