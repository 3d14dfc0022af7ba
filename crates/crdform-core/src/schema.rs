//! CRD descriptors: the metadata that drives every resource
//!
//! A [`ResourceDescriptor`] replaces what would otherwise be one generated
//! type per CRD. It names the API group/version/kind, the plural resource
//! used in REST paths, and the tree of [`FieldSchema`] attributes that make
//! up the object body (usually a single `spec` object).
//!
//! Descriptors are plain data and (de)serialize as YAML:
//!
//! ```yaml
//! group: loki.grafana.com
//! version: v1
//! kind: RulerConfig
//! plural: rulerconfigs
//! fields:
//!   - name: spec
//!     type: object
//!     fields:
//!       - name: poll_interval
//!         type: string
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::coordinates::ResourceCoordinates;

/// Prefix for generated resource type names
pub const TYPE_NAME_PREFIX: &str = "crdform";

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Int64,
    Float64,
    Bool,
    /// Ordered list of homogeneous elements
    List { items: Box<FieldKind> },
    /// String-keyed map; keys are passed through untranslated
    Map { items: Box<FieldKind> },
    /// Nested object with its own attributes
    Object { fields: Vec<FieldSchema> },
    /// Free-form JSON (`x-kubernetes-preserve-unknown-fields`)
    Dynamic,
}

impl FieldKind {
    /// Short name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::List { .. } => "list",
            Self::Map { .. } => "map",
            Self::Object { .. } => "object",
            Self::Dynamic => "dynamic",
        }
    }

    pub fn list(items: FieldKind) -> Self {
        Self::List {
            items: Box::new(items),
        }
    }

    pub fn map(items: FieldKind) -> Self {
        Self::Map {
            items: Box::new(items),
        }
    }
}

/// A single attribute of a CRD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Configuration-facing name (snake_case)
    pub name: String,

    /// Serialization key; derived from `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(flatten)]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    /// Set by the provider or server, never sent
    #[serde(default, skip_serializing_if = "is_false")]
    pub computed: bool,

    /// Exempt from omitempty: an explicit null is sent on the wire
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            key: None,
            kind,
            required: false,
            computed: false,
            nullable: false,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int64)
    }

    pub fn float64(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float64)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Dynamic)
    }

    pub fn list(name: impl Into<String>, items: FieldKind) -> Self {
        Self::new(name, FieldKind::list(items))
    }

    pub fn map(name: impl Into<String>, items: FieldKind) -> Self {
        Self::new(name, FieldKind::map(items))
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self::new(name, FieldKind::Object { fields })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Override the serialization key (e.g., when the CRD uses an acronym)
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Key used in the JSON document
    pub fn serialization_key(&self) -> Cow<'_, str> {
        match &self.key {
            Some(key) => Cow::Borrowed(key.as_str()),
            None => Cow::Owned(to_camel_case(&self.name)),
        }
    }
}

/// Metadata describing one namespaced CRD kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Plural resource name used in REST paths
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level body attributes (metadata is implicit)
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl ResourceDescriptor {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Resource type name, e.g. `crdform_loki_grafana_com_ruler_config_v1`
    pub fn type_name(&self) -> String {
        let group = self.group.replace(['.', '-'], "_");
        format!(
            "{}_{}_{}_{}",
            TYPE_NAME_PREFIX,
            group,
            to_snake_case(&self.kind),
            self.version
        )
    }

    /// Data source that renders the manifest locally
    pub fn manifest_type_name(&self) -> String {
        format!("{}_manifest", self.type_name())
    }

    pub fn coordinates(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> ResourceCoordinates {
        ResourceCoordinates::new(
            self.group.clone(),
            self.version.clone(),
            self.plural.clone(),
            namespace,
            name,
        )
    }

    /// Look up a top-level body attribute by configuration name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Attributes of the implicit `metadata` block
    pub fn metadata_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::string("name").required(),
            FieldSchema::string("namespace").required(),
            FieldSchema::map("labels", FieldKind::String),
            FieldSchema::map("annotations", FieldKind::String),
        ]
    }
}

/// `poll_interval` -> `pollInterval`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `RulerConfig` -> `ruler_config`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && !chars[i - 1].is_uppercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
