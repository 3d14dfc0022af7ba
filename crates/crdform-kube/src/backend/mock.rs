//! Mock cluster for testing
//!
//! Stores objects in memory and implements enough of server-side apply to
//! exercise field ownership without a Kubernetes cluster: per-field
//! managers, conflicts reported in the API server's wording, forced
//! takeover, and removal of fields a manager stops applying.
//!
//! Managers that apply the same value share a field. Changing a shared
//! value conflicts with every other owner, and the field is only removed
//! once no owner applies it any more.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue, json};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use super::ClusterBackend;
use crate::apply::ApplyRequest;
use crate::error::{KubeError, Result};
use crdform_core::{ResourceCoordinates, UnstructuredDocument};

/// Object keys as segments, e.g. `["spec", "pollInterval"]`
type FieldPath = Vec<String>;

/// Managers owning each applied field
type Owners = BTreeMap<FieldPath, BTreeSet<String>>;

/// Metadata the server owns; never tracked as applied fields
const SERVER_METADATA: [&str; 8] = [
    "name",
    "namespace",
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "deletionTimestamp",
    "managedFields",
];

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub applies: usize,
    pub deletes: usize,
}

impl OperationCounts {
    pub fn total(&self) -> usize {
        self.gets + self.applies + self.deletes
    }
}

/// Failure returned by every call until cleared
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Connection-level failure
    Transport(String),
    /// An API status response
    Status {
        code: u16,
        reason: String,
        message: String,
    },
    /// A response body that is not valid JSON
    MalformedBody(String),
}

#[derive(Debug, Clone)]
struct StoredObject {
    content: JsonValue,
    owners: Owners,
    uid: String,
    resource_version: u64,
    /// Reads left before a deleted object disappears
    terminating: Option<u32>,
}

impl StoredObject {
    fn render(&self) -> UnstructuredDocument {
        let mut doc = self.content.clone();
        let managers: BTreeSet<&String> = self.owners.values().flatten().collect();
        let api_version = doc.get("apiVersion").cloned().unwrap_or(JsonValue::Null);
        let managed_fields: Vec<JsonValue> = managers
            .into_iter()
            .map(|manager| {
                json!({
                    "manager": manager,
                    "operation": "Apply",
                    "apiVersion": api_version,
                })
            })
            .collect();

        if let Some(metadata) = doc.get_mut("metadata").and_then(JsonValue::as_object_mut) {
            metadata.insert("uid".to_string(), json!(self.uid));
            metadata.insert(
                "resourceVersion".to_string(),
                json!(self.resource_version.to_string()),
            );
            metadata.insert("managedFields".to_string(), JsonValue::Array(managed_fields));
        }
        UnstructuredDocument(doc)
    }
}

#[derive(Default)]
struct ClusterState {
    objects: HashMap<ResourceCoordinates, StoredObject>,
    last_resource_version: u64,
    last_uid: u64,
    failure: Option<MockFailure>,
    delete_delay: u32,
    latency: Option<Duration>,
}

/// In-memory cluster for testing
#[derive(Clone, Default)]
pub struct MockCluster {
    state: Arc<RwLock<ClusterState>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

impl MockCluster {
    /// Create a new empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap_or_else(PoisonError::into_inner) =
            OperationCounts::default();
    }

    /// Fail every following call with `failure` (None clears it)
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        self.state_mut().failure = failure;
    }

    /// Keep deleted objects visible for this many reads
    pub fn set_delete_delay(&self, reads: u32) {
        self.state_mut().delete_delay = reads;
    }

    /// Delay every call
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state_mut().latency = latency;
    }

    /// Current object, without counting as an operation
    pub fn object(&self, coords: &ResourceCoordinates) -> Option<UnstructuredDocument> {
        self.state_mut().objects.get(coords).map(StoredObject::render)
    }

    /// Field path (e.g. ".spec.pollInterval") to its owning managers, sorted
    pub fn field_managers(&self, coords: &ResourceCoordinates) -> BTreeMap<String, Vec<String>> {
        self.state_mut()
            .objects
            .get(coords)
            .map(|object| {
                object
                    .owners
                    .iter()
                    .map(|(path, managers)| {
                        (display_path(path), managers.iter().cloned().collect())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count stored objects
    pub fn object_count(&self) -> usize {
        self.state_mut().objects.len()
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ClusterState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn count(&self, update: impl FnOnce(&mut OperationCounts)) {
        let mut ops = self.operations.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut ops);
    }

    /// Apply latency, then report any injected failure
    async fn begin(&self, coords: &ResourceCoordinates) -> Result<()> {
        let (latency, failure) = {
            let state = self.state_mut();
            (state.latency, state.failure.clone())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match failure {
            None => Ok(()),
            Some(MockFailure::Transport(message)) => Err(KubeError::Transport(message)),
            Some(MockFailure::Status {
                code,
                reason,
                message,
            }) => Err(KubeError::from_status(coords, code, &reason, &message)),
            Some(MockFailure::MalformedBody(body)) => {
                UnstructuredDocument::parse(body.as_bytes())?;
                Ok(())
            }
        }
    }
}

fn not_found(coords: &ResourceCoordinates) -> KubeError {
    KubeError::from_status(
        coords,
        404,
        "NotFound",
        &format!("{} \"{}\" not found", coords.resource, coords.name),
    )
}

fn bad_request(coords: &ResourceCoordinates, message: String) -> KubeError {
    KubeError::from_status(coords, 400, "BadRequest", &message)
}

#[async_trait]
impl ClusterBackend for MockCluster {
    async fn get(&self, coords: &ResourceCoordinates) -> Result<UnstructuredDocument> {
        self.count(|ops| ops.gets += 1);
        self.begin(coords).await?;

        let mut state = self.state_mut();
        let expired = match state.objects.get_mut(coords) {
            None => return Err(not_found(coords)),
            Some(object) => match object.terminating {
                Some(0) => true,
                Some(reads) => {
                    object.terminating = Some(reads - 1);
                    false
                }
                None => false,
            },
        };
        if expired {
            state.objects.remove(coords);
            return Err(not_found(coords));
        }
        state
            .objects
            .get(coords)
            .map(StoredObject::render)
            .ok_or_else(|| not_found(coords))
    }

    async fn apply(
        &self,
        coords: &ResourceCoordinates,
        request: &ApplyRequest,
    ) -> Result<UnstructuredDocument> {
        self.count(|ops| ops.applies += 1);
        self.begin(coords).await?;

        let patch = validate_patch(coords, request.document())?;
        let manager = request.field_manager();
        let mut applied = BTreeMap::new();
        flatten(&applied_fields(&patch), &mut Vec::new(), &mut applied);

        let mut state = self.state_mut();
        let existing = state.objects.get(coords).cloned();

        if let Some(object) = &existing {
            let conflicts: Vec<(FieldPath, String)> = applied
                .iter()
                .filter(|(path, value)| !holds(lookup(&object.content, path), value))
                .flat_map(|(path, _)| {
                    object
                        .owners
                        .get(path)
                        .into_iter()
                        .flatten()
                        .filter(|owner| owner.as_str() != manager)
                        .map(move |owner| (path.clone(), owner.clone()))
                })
                .collect();
            if !conflicts.is_empty() && !request.force_conflicts() {
                let message = conflict_message(&coords.api_version(), &conflicts);
                return Err(KubeError::from_status(coords, 409, "Conflict", &message));
            }
        }

        let (mut content, mut owners) = match &existing {
            Some(object) => (object.content.clone(), object.owners.clone()),
            None => (
                json!({
                    "metadata": { "name": coords.name, "namespace": coords.namespace }
                }),
                BTreeMap::new(),
            ),
        };
        for key in ["apiVersion", "kind"] {
            if let (Some(value), Some(root)) = (patch.get(key), content.as_object_mut()) {
                root.insert(key.to_string(), value.clone());
            }
        }

        let dropped: Vec<FieldPath> = owners
            .iter()
            .filter(|(path, managers)| managers.contains(manager) && !applied.contains_key(*path))
            .map(|(path, _)| path.clone())
            .collect();
        for path in dropped {
            let orphaned = owners.get_mut(&path).is_some_and(|managers| {
                managers.remove(manager);
                managers.is_empty()
            });
            if orphaned {
                owners.remove(&path);
                remove_field(&mut content, &path, &owners);
            }
        }
        for (path, value) in applied {
            let managers = owners.entry(path.clone()).or_default();
            // A changed value leaves the applier as sole owner; it only gets
            // here unconflicted or forced.
            if !holds(lookup(&content, &path), &value) {
                managers.clear();
            }
            managers.insert(manager.to_string());
            set_field(&mut content, &path, value);
        }

        let object = match existing {
            Some(object) if object.content == content && object.owners == owners => object,
            Some(object) => {
                state.last_resource_version += 1;
                StoredObject {
                    content,
                    owners,
                    resource_version: state.last_resource_version,
                    ..object
                }
            }
            None => {
                state.last_resource_version += 1;
                state.last_uid += 1;
                StoredObject {
                    content,
                    owners,
                    uid: format!("00000000-0000-0000-0000-{:012}", state.last_uid),
                    resource_version: state.last_resource_version,
                    terminating: None,
                }
            }
        };
        let rendered = object.render();
        state.objects.insert(coords.clone(), object);
        Ok(rendered)
    }

    async fn delete(&self, coords: &ResourceCoordinates) -> Result<()> {
        self.count(|ops| ops.deletes += 1);
        self.begin(coords).await?;

        let mut state = self.state_mut();
        let delay = state.delete_delay;
        let Some(object) = state.objects.get_mut(coords) else {
            return Err(not_found(coords));
        };
        if delay > 0 {
            object.terminating.get_or_insert(delay);
        } else {
            state.objects.remove(coords);
        }
        Ok(())
    }
}

/// Reject patches whose identity disagrees with the request URL
fn validate_patch(
    coords: &ResourceCoordinates,
    document: &UnstructuredDocument,
) -> Result<Map<String, JsonValue>> {
    let Some(patch) = document.inner().as_object() else {
        return Err(bad_request(coords, "apply patch must be an object".to_string()));
    };

    let expected = coords.api_version();
    match document.api_version() {
        Some(api_version) if api_version == expected => {}
        other => {
            return Err(bad_request(
                coords,
                format!(
                    "the API version in the data ({}) does not match the expected API version ({})",
                    other.unwrap_or_default(),
                    expected
                ),
            ));
        }
    }
    if document.kind().is_none_or(str::is_empty) {
        return Err(bad_request(coords, "Object 'Kind' is missing".to_string()));
    }
    if document.name() != Some(coords.name.as_str()) {
        return Err(bad_request(
            coords,
            format!(
                "the name of the object ({}) does not match the name on the URL ({})",
                document.name().unwrap_or_default(),
                coords.name
            ),
        ));
    }
    if let Some(namespace) = document.namespace()
        && namespace != coords.namespace
    {
        return Err(bad_request(
            coords,
            format!(
                "the namespace of the provided object ({}) does not match the namespace sent on the request ({})",
                namespace, coords.namespace
            ),
        ));
    }
    Ok(patch.clone())
}

/// The patch minus identity and server-owned metadata
fn applied_fields(patch: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut fields = patch.clone();
    fields.remove("apiVersion");
    fields.remove("kind");
    fields.remove("status");
    let metadata_empty = match fields.get_mut("metadata") {
        Some(JsonValue::Object(metadata)) => {
            for key in SERVER_METADATA {
                metadata.remove(key);
            }
            metadata.is_empty()
        }
        _ => false,
    };
    if metadata_empty {
        fields.remove("metadata");
    }
    fields
}

/// Leaves are scalars, nulls, lists (atomic) and empty objects
fn flatten(
    map: &Map<String, JsonValue>,
    prefix: &mut FieldPath,
    out: &mut BTreeMap<FieldPath, JsonValue>,
) {
    for (key, value) in map {
        prefix.push(key.clone());
        match value {
            JsonValue::Object(child) if !child.is_empty() => flatten(child, prefix, out),
            leaf => {
                out.insert(prefix.clone(), leaf.clone());
            }
        }
        prefix.pop();
    }
}

/// Whether `current` already holds an applied leaf
///
/// An applied empty object only asserts that the object exists.
fn holds(current: Option<&JsonValue>, applied: &JsonValue) -> bool {
    match (current, applied) {
        (Some(JsonValue::Object(_)), JsonValue::Object(map)) if map.is_empty() => true,
        (current, applied) => current == Some(applied),
    }
}

fn lookup<'a>(content: &'a JsonValue, path: &[String]) -> Option<&'a JsonValue> {
    path.iter().try_fold(content, |node, key| node.get(key))
}

fn lookup_mut<'a>(content: &'a mut JsonValue, path: &[String]) -> Option<&'a mut JsonValue> {
    path.iter().try_fold(content, |node, key| node.get_mut(key))
}

fn set_field(content: &mut JsonValue, path: &[String], value: JsonValue) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = content;
    for key in parents {
        node = match node {
            JsonValue::Object(map) => map
                .entry(key.clone())
                .or_insert_with(|| JsonValue::Object(Map::new())),
            _ => return,
        };
        if !node.is_object() {
            *node = JsonValue::Object(Map::new());
        }
    }
    if let JsonValue::Object(map) = node {
        if holds(map.get(last), &value) {
            return;
        }
        map.insert(last.clone(), value);
    }
}

/// Remove a leaf, then any parents it leaves empty
///
/// `metadata` and parents that are themselves owned leaves are kept.
fn remove_field(content: &mut JsonValue, path: &[String], owners: &Owners) {
    remove_key(content, path);
    for depth in (1..path.len()).rev() {
        let parent = &path[..depth];
        if parent == ["metadata"] || owners.contains_key(parent) {
            break;
        }
        match lookup(content, parent) {
            Some(JsonValue::Object(map)) if map.is_empty() => remove_key(content, parent),
            _ => break,
        }
    }
}

fn remove_key(content: &mut JsonValue, path: &[String]) {
    if let Some((last, parents)) = path.split_last()
        && let Some(JsonValue::Object(map)) = lookup_mut(content, parents)
    {
        map.remove(last);
    }
}

fn display_path(path: &[String]) -> String {
    format!(".{}", path.join("."))
}

/// Build the API server's conflict message
fn conflict_message(api_version: &str, conflicts: &[(FieldPath, String)]) -> String {
    if let [(path, manager)] = conflicts {
        return format!(
            "Apply failed with 1 conflict: conflict with \"{}\" using {}: {}",
            manager,
            api_version,
            display_path(path)
        );
    }

    let mut by_manager: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (path, manager) in conflicts {
        by_manager
            .entry(manager.as_str())
            .or_default()
            .push(display_path(path));
    }

    let groups: Vec<String> = by_manager
        .into_iter()
        .map(|(manager, paths)| match paths.as_slice() {
            [single] => format!("conflict with \"{}\" using {}: {}", manager, api_version, single),
            _ => format!(
                "conflicts with \"{}\" using {}:\n{}",
                manager,
                api_version,
                paths
                    .iter()
                    .map(|p| format!("- {}", p))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        })
        .collect();
    format!(
        "Apply failed with {} conflicts: {}",
        conflicts.len(),
        groups.join("\n")
    )
}
