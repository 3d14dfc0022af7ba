//! Managed resources
//!
//! One [`CrdResource`] per resource instance in a plan. Each lifecycle call
//! is independent: nothing is cached between calls, and state always comes
//! from the latest server response.
//!
//! ```text
//! Unconfigured --configure--> Ready --create/update/import--> Applied | Synced
//!                                   --read (missing)--------> Absent
//!                                   --delete----------------> Gone
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::apply::ApplyEngine;
use crate::error::{KubeError, Operation, Result};
use crate::provider::Provider;
use crate::read::ReadProjector;
use crdform_core::{
    CoreError, FIELD_MANAGER_ATTRIBUTE, FORCE_CONFLICTS_ATTRIBUTE, ID_ATTRIBUTE,
    ResourceCoordinates, ResourceDescriptor, SchemaProjector, TypedConfig,
    WAIT_FOR_DELETE_ATTRIBUTE, parse_import_id,
};

/// Poll interval while waiting for a deleted object to disappear
const DELETE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on waiting for deletion when no request timeout is set
pub const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(300);

/// Lifecycle state of one resource instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Unconfigured,
    Ready,
    /// Last operation applied the desired state
    Applied,
    /// Last operation read the object back
    Synced,
    /// The object was found missing; drop it from state
    Absent,
    /// The object was deleted
    Gone,
}

impl ResourceState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Absent | Self::Gone)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::Ready => "ready",
            Self::Applied => "applied",
            Self::Synced => "synced",
            Self::Absent => "absent",
            Self::Gone => "gone",
        };
        f.write_str(name)
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The object was already missing
    AlreadyGone,
}

/// A CRD-backed resource
pub struct CrdResource {
    descriptor: ResourceDescriptor,
    provider: Option<Arc<Provider>>,
    state: ResourceState,
}

impl CrdResource {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            provider: None,
            state: ResourceState::Unconfigured,
        }
    }

    /// Attach the provider; the resource becomes usable
    pub fn configure(&mut self, provider: Arc<Provider>) {
        self.provider = Some(provider);
        if self.state == ResourceState::Unconfigured {
            self.state = ResourceState::Ready;
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// Apply `plan` to create the object
    pub async fn create(&mut self, plan: &TypedConfig) -> Result<TypedConfig> {
        self.apply(Operation::Create, plan).await
    }

    /// Apply `plan` over the existing object
    pub async fn update(&mut self, plan: &TypedConfig) -> Result<TypedConfig> {
        self.apply(Operation::Update, plan).await
    }

    /// Refresh `state` from the server
    ///
    /// Returns `None` when the object no longer exists.
    pub async fn read(&mut self, state: &TypedConfig) -> Result<Option<TypedConfig>> {
        let provider = self.ready(Operation::Read)?;
        let coords = self.coordinates(state)?;

        match ReadProjector::new(&provider).read(&coords).await {
            Ok(doc) => {
                let refreshed = ReadProjector::read_into(&self.descriptor, state, &doc)?;
                self.state = ResourceState::Synced;
                Ok(Some(refreshed))
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(%coords, "object no longer exists, removing from state");
                self.state = ResourceState::Absent;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the object described by `state`
    ///
    /// A missing object counts as deleted. With `wait_for_delete` set, waits
    /// until the object disappears.
    pub async fn delete(&mut self, state: &TypedConfig) -> Result<DeleteOutcome> {
        let provider = self.ready(Operation::Delete)?;
        let coords = self.coordinates(state)?;
        let backend = provider.backend(Operation::Delete)?;

        let outcome = match provider.call(backend.delete(&coords)).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) if e.is_not_found() => {
                tracing::debug!(%coords, "already deleted");
                DeleteOutcome::AlreadyGone
            }
            Err(e) => return Err(e),
        };

        if outcome == DeleteOutcome::Deleted && state.get(WAIT_FOR_DELETE_ATTRIBUTE).as_bool() == Some(true) {
            let timeout = provider
                .config()
                .request_timeout
                .unwrap_or(DEFAULT_DELETE_TIMEOUT);
            wait_for_delete(&provider, &coords, timeout).await?;
        }

        tracing::info!(%coords, ?outcome, "deleted");
        self.state = ResourceState::Gone;
        Ok(outcome)
    }

    /// Adopt an existing object by its `namespace/name` id
    ///
    /// The id is validated before any network call.
    pub async fn import_state(&mut self, id: &str) -> Result<TypedConfig> {
        let provider = self.ready(Operation::Import)?;
        let (namespace, name) = parse_import_id(id)?;
        provider.gate().check(Operation::Import)?;

        let coords = self.descriptor.coordinates(namespace, name);
        coords.validate()?;

        let doc = ReadProjector::new(&provider).read(&coords).await?;
        let imported = ReadProjector::read_into(&self.descriptor, &TypedConfig::new(), &doc)?;
        tracing::info!(%coords, "imported");
        self.state = ResourceState::Synced;
        Ok(imported)
    }

    async fn apply(&mut self, operation: Operation, plan: &TypedConfig) -> Result<TypedConfig> {
        let provider = self.ready(operation)?;
        let coords = self.coordinates(plan)?;
        let document = SchemaProjector::new(&self.descriptor).encode(plan)?;

        let engine = ApplyEngine::new(&provider);
        let request = engine.request(
            document,
            plan.get(FIELD_MANAGER_ATTRIBUTE).as_str(),
            plan.get(FORCE_CONFLICTS_ATTRIBUTE).as_bool(),
        )?;
        let applied = engine.apply(&coords, &request).await?;

        let state = ReadProjector::read_into(&self.descriptor, plan, &applied)?;
        self.state = ResourceState::Applied;
        Ok(state)
    }

    /// The provider, if `operation` is allowed in the current state
    fn ready(&self, operation: Operation) -> Result<Arc<Provider>> {
        let invalid = || KubeError::InvalidState {
            state: self.state.to_string(),
            operation,
        };
        if self.state.is_terminal() {
            return Err(invalid());
        }
        self.provider.clone().ok_or_else(invalid)
    }

    /// Coordinates from `metadata`, falling back to `id`
    fn coordinates(&self, config: &TypedConfig) -> Result<ResourceCoordinates> {
        let namespace = config.lookup("metadata.namespace").as_str();
        let name = config.lookup("metadata.name").as_str();

        let coords = match (namespace, name) {
            (Some(namespace), Some(name)) => self.descriptor.coordinates(namespace, name),
            _ => match config.get(ID_ATTRIBUTE).as_str() {
                Some(id) => {
                    let (namespace, name) = parse_import_id(id)?;
                    self.descriptor.coordinates(namespace, name)
                }
                None => {
                    return Err(CoreError::MissingField {
                        field: "metadata.name".to_string(),
                    }
                    .into());
                }
            },
        };
        coords.validate()?;
        Ok(coords)
    }
}

/// Poll until the object is gone or `timeout` elapses
async fn wait_for_delete(
    provider: &Provider,
    coords: &ResourceCoordinates,
    timeout: Duration,
) -> Result<()> {
    let reader = ReadProjector::new(provider);
    let start = Instant::now();

    loop {
        match reader.read(coords).await {
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
            Ok(_) => {}
        }

        if start.elapsed() > timeout {
            return Err(KubeError::Timeout(format!(
                "{:?} waiting for {} to be deleted",
                timeout, coords
            )));
        }

        tracing::debug!(%coords, "waiting for deletion");
        tokio::time::sleep(DELETE_POLL_INTERVAL).await;
    }
}
