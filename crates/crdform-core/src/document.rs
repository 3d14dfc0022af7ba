//! Unstructured Kubernetes documents at the wire boundary

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// An arbitrary Kubernetes object as sent to or returned by the API server
///
/// Only the Schema Projector converts between this and typed configuration;
/// everything else passes it around opaquely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnstructuredDocument(pub JsonValue);

impl UnstructuredDocument {
    /// Skeleton document with `apiVersion`, `kind` and an empty `metadata`
    pub fn new(api_version: &str, kind: &str) -> Self {
        let mut root = Map::new();
        root.insert("apiVersion".into(), JsonValue::String(api_version.into()));
        root.insert("kind".into(), JsonValue::String(kind.into()));
        root.insert("metadata".into(), JsonValue::Object(Map::new()));
        Self(JsonValue::Object(root))
    }

    /// Parse raw bytes, reporting the byte offset of malformed input
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|e| CoreError::decode(bytes, &e))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(JsonValue::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(JsonValue::as_str)
    }

    pub fn metadata(&self) -> Option<&Map<String, JsonValue>> {
        self.0.get("metadata").and_then(JsonValue::as_object)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.metadata_str("resourceVersion")
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.metadata_string_map("labels")
    }

    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.metadata_string_map("annotations")
    }

    pub fn spec(&self) -> Option<&JsonValue> {
        self.0.get("spec")
    }

    /// Get a value by dotted path (e.g., "spec.pollInterval")
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        path.split('.').try_fold(&self.0, |value, part| value.get(part))
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get(key))
            .and_then(JsonValue::as_str)
    }

    fn metadata_string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.metadata()
            .and_then(|m| m.get(key))
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<JsonValue> for UnstructuredDocument {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}
