//! Schema Projector: typed configuration <-> unstructured documents
//!
//! The projector walks a [`ResourceDescriptor`]'s field tree in one of two
//! naming modes:
//!
//! - **Wire**: keys are serialization keys (`pollInterval`), `Unset` is
//!   omitted and `Null` is only sent for `nullable` fields. Used for the
//!   documents exchanged with the API server.
//! - **Config**: keys are configuration-facing names (`poll_interval`) and
//!   resource-level attributes (`id`, `field_manager`, ...) are included.
//!   Used to read user configuration files and to print state.
//!
//! Keys found in a document but not in the schema are dropped on decode.

use serde_json::{Map, Number, Value as JsonValue};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::attr::{Attr, AttrValue, TypedConfig, TypedObject};
use crate::document::UnstructuredDocument;
use crate::error::{CoreError, Result};
use crate::schema::{FieldKind, FieldSchema, ResourceDescriptor};

/// Computed identifier, `namespace/name`
pub const ID_ATTRIBUTE: &str = "id";
/// Per-resource field manager override
pub const FIELD_MANAGER_ATTRIBUTE: &str = "field_manager";
/// Per-resource conflict forcing override
pub const FORCE_CONFLICTS_ATTRIBUTE: &str = "force_conflicts";
/// Wait for the object to disappear after delete
pub const WAIT_FOR_DELETE_ATTRIBUTE: &str = "wait_for_delete";

const METADATA: &str = "metadata";

/// Attributes that only exist in configuration/state, never on the server
pub const USER_ONLY_ATTRIBUTES: [&str; 3] = [
    FIELD_MANAGER_ATTRIBUTE,
    FORCE_CONFLICTS_ATTRIBUTE,
    WAIT_FOR_DELETE_ATTRIBUTE,
];

/// Resource-level attributes alongside `metadata` and the body fields
pub fn resource_attributes() -> Vec<FieldSchema> {
    vec![
        FieldSchema::string(ID_ATTRIBUTE).computed(),
        FieldSchema::string(FIELD_MANAGER_ATTRIBUTE),
        FieldSchema::bool(FORCE_CONFLICTS_ATTRIBUTE),
        FieldSchema::bool(WAIT_FOR_DELETE_ATTRIBUTE),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    Wire,
    Config,
}

impl Naming {
    fn key(self, field: &FieldSchema) -> Cow<'_, str> {
        match self {
            Self::Wire => field.serialization_key(),
            Self::Config => Cow::Borrowed(field.name.as_str()),
        }
    }
}

/// Converts between [`TypedConfig`] and [`UnstructuredDocument`] for one CRD
#[derive(Debug, Clone, Copy)]
pub struct SchemaProjector<'a> {
    descriptor: &'a ResourceDescriptor,
}

impl<'a> SchemaProjector<'a> {
    pub fn new(descriptor: &'a ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &'a ResourceDescriptor {
        self.descriptor
    }

    /// Encode configuration into the document sent to the API server
    ///
    /// `apiVersion` and `kind` always come from the descriptor.
    pub fn encode(&self, config: &TypedConfig) -> Result<UnstructuredDocument> {
        self.check_root_attributes(config)?;

        let mut root = Map::new();
        root.insert(
            "apiVersion".to_string(),
            JsonValue::String(self.descriptor.api_version()),
        );
        root.insert(
            "kind".to_string(),
            JsonValue::String(self.descriptor.kind.clone()),
        );

        let metadata = match config.get(METADATA) {
            Attr::Value(AttrValue::Object(object)) => object,
            Attr::Value(_) => return Err(CoreError::mismatch(METADATA, "object")),
            Attr::Unset | Attr::Null => {
                return Err(CoreError::MissingField {
                    field: "metadata.name".to_string(),
                });
            }
        };
        let metadata =
            encode_object(&ResourceDescriptor::metadata_fields(), metadata, METADATA, Naming::Wire)?;
        root.insert(METADATA.to_string(), JsonValue::Object(metadata));

        for field in &self.descriptor.fields {
            if field.computed {
                continue;
            }
            let attr = config.get(&field.name);
            if let Some(value) = encode_field(field, attr, &field.name, Naming::Wire)? {
                root.insert(field.serialization_key().into_owned(), value);
            }
        }

        Ok(UnstructuredDocument(JsonValue::Object(root)))
    }

    /// Decode a server document into configuration
    ///
    /// `id` and user-only attributes are left unset; see
    /// [`SchemaProjector::merge_state`].
    pub fn decode(&self, doc: &UnstructuredDocument) -> Result<TypedConfig> {
        let root = doc
            .inner()
            .as_object()
            .ok_or_else(|| CoreError::mismatch("", "object"))?;

        if let Some(kind) = doc.kind()
            && kind != self.descriptor.kind
        {
            return Err(CoreError::mismatch("kind", self.descriptor.kind.clone()));
        }

        let mut config = TypedConfig::new();
        match root.get(METADATA) {
            Some(JsonValue::Object(metadata)) => {
                let metadata = decode_object(
                    &ResourceDescriptor::metadata_fields(),
                    metadata,
                    METADATA,
                    Naming::Wire,
                )?;
                config.set(METADATA, metadata);
            }
            Some(JsonValue::Null) | None => {}
            Some(_) => return Err(CoreError::mismatch(METADATA, "object")),
        }

        for field in &self.descriptor.fields {
            let key = field.serialization_key();
            if let Some(value) = root.get(key.as_ref()) {
                config.set(field.name.clone(), decode_field(field, value, &field.name, Naming::Wire)?);
            }
        }

        Ok(config)
    }

    /// Parse and decode raw response bytes
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<TypedConfig> {
        self.decode(&UnstructuredDocument::parse(bytes)?)
    }

    /// Read configuration keyed by configuration-facing names
    pub fn config_from_value(&self, value: &JsonValue) -> Result<TypedConfig> {
        let root = value
            .as_object()
            .ok_or_else(|| CoreError::mismatch("", "object"))?;
        self.check_config_keys(root)?;
        decode_object(&self.config_fields(), root, "", Naming::Config)
    }

    /// Read a YAML configuration file's contents
    pub fn config_from_yaml(&self, yaml: &str) -> Result<TypedConfig> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        self.config_from_value(&value)
    }

    /// Render configuration/state keyed by configuration-facing names
    pub fn config_to_value(&self, config: &TypedConfig) -> Result<JsonValue> {
        self.check_root_attributes(config)?;
        encode_object(&self.config_fields(), config, "", Naming::Config).map(JsonValue::Object)
    }

    /// Combine freshly fetched state with the prior state
    ///
    /// User-only attributes are kept from `prior`; everything else comes from
    /// the server.
    pub fn merge_state(&self, prior: &TypedConfig, fetched: TypedConfig) -> TypedConfig {
        let mut merged = fetched;
        for name in USER_ONLY_ATTRIBUTES {
            merged.set(name, prior.get(name).clone());
        }
        merged
    }

    /// Every root attribute in config naming
    fn config_fields(&self) -> Vec<FieldSchema> {
        let mut fields = resource_attributes();
        fields.push(FieldSchema::object(METADATA, ResourceDescriptor::metadata_fields()).required());
        fields.extend(self.descriptor.fields.iter().cloned());
        fields
    }

    fn is_root_attribute(&self, name: &str) -> bool {
        name == METADATA
            || resource_attributes().iter().any(|f| f.name == name)
            || self.descriptor.field(name).is_some()
    }

    fn check_root_attributes(&self, config: &TypedConfig) -> Result<()> {
        match config.iter().find(|(name, _)| !self.is_root_attribute(name)) {
            Some((name, _)) => Err(unknown_attribute(name)),
            None => Ok(()),
        }
    }

    fn check_config_keys(&self, root: &Map<String, JsonValue>) -> Result<()> {
        match root.keys().find(|name| !self.is_root_attribute(name)) {
            Some(name) => Err(unknown_attribute(name)),
            None => Ok(()),
        }
    }
}

fn unknown_attribute(path: &str) -> CoreError {
    CoreError::InvalidConfig {
        message: format!("unknown attribute '{}'", path),
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn encode_object(
    fields: &[FieldSchema],
    object: &TypedObject,
    path: &str,
    naming: Naming,
) -> Result<Map<String, JsonValue>> {
    if naming == Naming::Wire
        && let Some((name, _)) = object
            .iter()
            .find(|(name, _)| !fields.iter().any(|f| &f.name == *name))
    {
        return Err(unknown_attribute(&child_path(path, name)));
    }

    let mut out = Map::new();
    for field in fields {
        if naming == Naming::Wire && field.computed {
            continue;
        }
        let field_path = child_path(path, &field.name);
        if let Some(value) = encode_field(field, object.get(&field.name), &field_path, naming)? {
            out.insert(naming.key(field).into_owned(), value);
        }
    }
    Ok(out)
}

fn encode_field(
    field: &FieldSchema,
    attr: &Attr,
    path: &str,
    naming: Naming,
) -> Result<Option<JsonValue>> {
    let missing = || CoreError::MissingField {
        field: path.to_string(),
    };
    match attr {
        Attr::Unset if naming == Naming::Wire && field.required => Err(missing()),
        Attr::Unset => Ok(None),
        Attr::Null if naming == Naming::Config => Ok(Some(JsonValue::Null)),
        Attr::Null if field.required => Err(missing()),
        Attr::Null if field.nullable => Ok(Some(JsonValue::Null)),
        Attr::Null => Ok(None),
        Attr::Value(value) => encode_value(&field.kind, value, path, naming).map(Some),
    }
}

/// List elements and map entries: unset and null both become JSON null
fn encode_element(kind: &FieldKind, attr: &Attr, path: &str, naming: Naming) -> Result<JsonValue> {
    match attr {
        Attr::Unset | Attr::Null => Ok(JsonValue::Null),
        Attr::Value(value) => encode_value(kind, value, path, naming),
    }
}

fn encode_value(kind: &FieldKind, value: &AttrValue, path: &str, naming: Naming) -> Result<JsonValue> {
    let mismatch = || CoreError::mismatch(path, kind.type_name());
    match (kind, value) {
        (FieldKind::String, AttrValue::String(s)) => Ok(JsonValue::String(s.clone())),
        (FieldKind::Int64, AttrValue::Int64(n)) => Ok(JsonValue::Number((*n).into())),
        (FieldKind::Float64, AttrValue::Float64(f)) => {
            Number::from_f64(*f).map(JsonValue::Number).ok_or_else(mismatch)
        }
        (FieldKind::Bool, AttrValue::Bool(b)) => Ok(JsonValue::Bool(*b)),
        (FieldKind::Dynamic, AttrValue::Dynamic(v)) => Ok(v.clone()),
        (FieldKind::List { items }, AttrValue::List(elements)) => elements
            .iter()
            .enumerate()
            .map(|(i, e)| encode_element(items, e, &format!("{}[{}]", path, i), naming))
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),
        (FieldKind::Map { items }, AttrValue::Map(entries)) => {
            let mut out = Map::new();
            for (key, entry) in entries {
                if entry.is_unset() {
                    continue;
                }
                let entry_path = format!("{}[{:?}]", path, key);
                out.insert(key.clone(), encode_element(items, entry, &entry_path, naming)?);
            }
            Ok(JsonValue::Object(out))
        }
        (FieldKind::Object { fields }, AttrValue::Object(object)) => {
            encode_object(fields, object, path, naming).map(JsonValue::Object)
        }
        _ => Err(mismatch()),
    }
}

fn decode_object(
    fields: &[FieldSchema],
    map: &Map<String, JsonValue>,
    path: &str,
    naming: Naming,
) -> Result<TypedObject> {
    if naming == Naming::Config
        && let Some(name) = map.keys().find(|k| !fields.iter().any(|f| &f.name == *k))
    {
        return Err(unknown_attribute(&child_path(path, name)));
    }

    let mut object = TypedObject::new();
    for field in fields {
        let key = naming.key(field);
        if let Some(value) = map.get(key.as_ref()) {
            let field_path = child_path(path, &field.name);
            object.set(field.name.clone(), decode_field(field, value, &field_path, naming)?);
        }
    }
    Ok(object)
}

fn decode_field(field: &FieldSchema, value: &JsonValue, path: &str, naming: Naming) -> Result<Attr> {
    decode_element(&field.kind, value, path, naming)
}

fn decode_element(kind: &FieldKind, value: &JsonValue, path: &str, naming: Naming) -> Result<Attr> {
    if value.is_null() {
        return Ok(Attr::Null);
    }
    decode_value(kind, value, path, naming).map(Attr::Value)
}

fn decode_value(kind: &FieldKind, value: &JsonValue, path: &str, naming: Naming) -> Result<AttrValue> {
    let mismatch = || CoreError::mismatch(path, kind.type_name());
    match kind {
        FieldKind::String => value
            .as_str()
            .map(|s| AttrValue::String(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Int64 => value.as_i64().map(AttrValue::Int64).ok_or_else(mismatch),
        FieldKind::Float64 => value.as_f64().map(AttrValue::Float64).ok_or_else(mismatch),
        FieldKind::Bool => value.as_bool().map(AttrValue::Bool).ok_or_else(mismatch),
        FieldKind::Dynamic => Ok(AttrValue::Dynamic(value.clone())),
        FieldKind::List { items } => {
            let array = value.as_array().ok_or_else(mismatch)?;
            array
                .iter()
                .enumerate()
                .map(|(i, e)| decode_element(items, e, &format!("{}[{}]", path, i), naming))
                .collect::<Result<Vec<_>>>()
                .map(AttrValue::List)
        }
        FieldKind::Map { items } => {
            let map = value.as_object().ok_or_else(mismatch)?;
            map.iter()
                .map(|(k, v)| {
                    decode_element(items, v, &format!("{}[{:?}]", path, k), naming)
                        .map(|attr| (k.clone(), attr))
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(AttrValue::Map)
        }
        FieldKind::Object { fields } => {
            let map = value.as_object().ok_or_else(mismatch)?;
            decode_object(fields, map, path, naming).map(AttrValue::Object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> ResourceDescriptor {
        ResourceDescriptor::new("example.com", "v1", "Widget", "widgets").with_field(
            FieldSchema::object(
                "spec",
                vec![
                    FieldSchema::string("poll_interval"),
                    FieldSchema::int64("replicas"),
                    FieldSchema::float64("ratio"),
                    FieldSchema::bool("enabled"),
                    FieldSchema::string("security_group").nullable(),
                    FieldSchema::string("comment"),
                    FieldSchema::list("tags", FieldKind::String),
                    FieldSchema::map("selector", FieldKind::String),
                    FieldSchema::list(
                        "ports",
                        FieldKind::Object {
                            fields: vec![
                                FieldSchema::string("name"),
                                FieldSchema::int64("port").required(),
                            ],
                        },
                    ),
                    FieldSchema::dynamic("extra"),
                    FieldSchema::string("tls_ca").with_key("tlsCA"),
                    FieldSchema::string("phase").computed(),
                ],
            )
            .required(),
        )
    }

    fn metadata(name: &str, namespace: &str) -> TypedObject {
        TypedObject::new().with("name", name).with("namespace", namespace)
    }

    fn mixed_config() -> TypedConfig {
        TypedConfig::new()
            .with(
                "metadata",
                metadata("w1", "ns1").with("labels", Attr::map([("app", Attr::string("demo"))])),
            )
            .with(
                "spec",
                TypedObject::new()
                    .with("poll_interval", "1m")
                    .with("replicas", 3i64)
                    .with("ratio", Attr::float64(0.5))
                    .with("enabled", false)
                    .with("security_group", Attr::Null)
                    .with("tags", Attr::list([]))
                    .with("selector", Attr::map::<String>([]))
                    .with(
                        "ports",
                        Attr::list([Attr::object(TypedObject::new().with("port", 80i64))]),
                    )
                    .with("extra", Attr::dynamic(json!({"free": ["form"]})))
                    .with("tls_ca", "pem"),
            )
    }

    #[test]
    fn test_encode_names_and_presence() {
        let descriptor = widget();
        let doc = SchemaProjector::new(&descriptor).encode(&mixed_config()).unwrap();

        assert_eq!(
            doc.inner(),
            &json!({
                "apiVersion": "example.com/v1",
                "kind": "Widget",
                "metadata": {"name": "w1", "namespace": "ns1", "labels": {"app": "demo"}},
                "spec": {
                    "pollInterval": "1m",
                    "replicas": 3,
                    "ratio": 0.5,
                    "enabled": false,
                    "securityGroup": null,
                    "tags": [],
                    "selector": {},
                    "ports": [{"port": 80}],
                    "extra": {"free": ["form"]},
                    "tlsCA": "pem"
                }
            })
        );
    }

    #[test]
    fn test_round_trip_mixed_presence() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);
        let config = mixed_config();

        let decoded = projector.decode(&projector.encode(&config).unwrap()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);
        let config = mixed_config();

        let bytes = projector.encode(&config).unwrap().to_json_bytes().unwrap();
        assert_eq!(projector.decode_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_round_trip_collections_built_with_unset() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);
        let config = TypedConfig::new().with("metadata", metadata("w1", "ns1")).with(
            "spec",
            TypedObject::new()
                .with("tags", Attr::list([Attr::string("a"), Attr::Unset]))
                .with("selector", Attr::map([("k", Attr::Unset), ("j", Attr::string("v"))])),
        );

        let doc = projector.encode(&config).unwrap();
        assert_eq!(doc.spec(), Some(&json!({"tags": ["a", null], "selector": {"j": "v"}})));
        assert_eq!(projector.decode(&doc).unwrap(), config);
    }

    #[test]
    fn test_null_on_non_nullable_is_omitted() {
        let descriptor = widget();
        let config = TypedConfig::new()
            .with("metadata", metadata("w1", "ns1"))
            .with("spec", TypedObject::new().with("comment", Attr::Null));

        let doc = SchemaProjector::new(&descriptor).encode(&config).unwrap();
        assert_eq!(doc.spec(), Some(&json!({})));
    }

    #[test]
    fn test_api_version_and_kind_not_from_config() {
        let descriptor = widget();
        let config = TypedConfig::new()
            .with("metadata", metadata("w1", "ns1"))
            .with("spec", TypedObject::new())
            .with("kind", "Evil");

        let err = SchemaProjector::new(&descriptor).encode(&config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_computed_and_user_only_not_encoded() {
        let descriptor = widget();
        let config = TypedConfig::new()
            .with("id", "ns1/w1")
            .with("field_manager", "me")
            .with("force_conflicts", true)
            .with("metadata", metadata("w1", "ns1"))
            .with("spec", TypedObject::new().with("phase", "Ready"));

        let doc = SchemaProjector::new(&descriptor).encode(&config).unwrap();
        let root = doc.inner().as_object().unwrap();
        assert!(!root.contains_key("id"));
        assert!(!root.contains_key("fieldManager"));
        assert_eq!(doc.spec(), Some(&json!({})));
    }

    #[test]
    fn test_required_fields() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);

        let no_spec = TypedConfig::new().with("metadata", metadata("w1", "ns1"));
        match projector.encode(&no_spec).unwrap_err() {
            CoreError::MissingField { field } => assert_eq!(field, "spec"),
            other => panic!("unexpected error: {other}"),
        }

        let no_metadata = TypedConfig::new().with("spec", TypedObject::new());
        assert!(matches!(
            projector.encode(&no_metadata).unwrap_err(),
            CoreError::MissingField { .. }
        ));

        let port_without_number = TypedConfig::new()
            .with("metadata", metadata("w1", "ns1"))
            .with(
                "spec",
                TypedObject::new().with(
                    "ports",
                    Attr::list([Attr::object(TypedObject::new().with("name", "http"))]),
                ),
            );
        match projector.encode(&port_without_number).unwrap_err() {
            CoreError::MissingField { field } => assert_eq!(field, "spec.ports[0].port"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_drops_unknown_fields() {
        let descriptor = widget();
        let doc = UnstructuredDocument(json!({
            "apiVersion": "example.com/v1",
            "kind": "Widget",
            "metadata": {"name": "w1", "namespace": "ns1", "uid": "abc", "resourceVersion": "7"},
            "spec": {"pollInterval": "5m", "futureField": true},
            "status": {"phase": "Ready"}
        }));

        let config = SchemaProjector::new(&descriptor).decode(&doc).unwrap();
        let expected = TypedConfig::new()
            .with("metadata", metadata("w1", "ns1"))
            .with("spec", TypedObject::new().with("poll_interval", "5m"));
        assert_eq!(config, expected);
    }

    #[test]
    fn test_decode_missing_optional_is_unset() {
        let descriptor = widget();
        let doc = UnstructuredDocument(json!({
            "kind": "Widget",
            "metadata": {"name": "w1", "namespace": "ns1"},
            "spec": {}
        }));
        let config = SchemaProjector::new(&descriptor).decode(&doc).unwrap();
        assert!(config.lookup("spec.replicas").is_unset());
        assert!(config.lookup("metadata.labels").is_unset());
    }

    #[test]
    fn test_decode_type_mismatch() {
        let descriptor = widget();
        let doc = UnstructuredDocument(json!({
            "kind": "Widget",
            "metadata": {"name": "w1", "namespace": "ns1"},
            "spec": {"replicas": "three"}
        }));
        match SchemaProjector::new(&descriptor).decode(&doc).unwrap_err() {
            CoreError::SchemaMismatch { path, expected } => {
                assert_eq!(path, "spec.replicas");
                assert_eq!(expected, "int64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_wrong_kind() {
        let descriptor = widget();
        let doc = UnstructuredDocument(json!({"kind": "Gadget", "metadata": {}}));
        assert!(SchemaProjector::new(&descriptor).decode(&doc).is_err());
    }

    #[test]
    fn test_decode_bytes_malformed() {
        let descriptor = widget();
        let err = SchemaProjector::new(&descriptor)
            .decode_bytes(br#"{"kind": "Widget", "spec": [}"#)
            .unwrap_err();
        match err {
            CoreError::Decode { offset, .. } => assert_eq!(offset, 28),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_config_yaml_names() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);
        let yaml = r#"
field_manager: team-a
metadata:
  name: w1
  namespace: ns1
spec:
  poll_interval: 1m
  tls_ca: pem
  security_group: null
"#;
        let config = projector.config_from_yaml(yaml).unwrap();
        assert_eq!(config.get("field_manager").as_str(), Some("team-a"));
        assert_eq!(config.lookup("spec.poll_interval").as_str(), Some("1m"));
        assert_eq!(config.lookup("spec.tls_ca").as_str(), Some("pem"));
        assert!(config.lookup("spec.security_group").is_null());

        let value = projector.config_to_value(&config).unwrap();
        assert_eq!(value["spec"]["poll_interval"], json!("1m"));
        assert_eq!(value["spec"]["security_group"], JsonValue::Null);
        assert_eq!(projector.config_from_value(&value).unwrap(), config);
    }

    #[test]
    fn test_config_rejects_unknown_attribute() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);

        let err = projector
            .config_from_yaml("metadata: {name: a, namespace: b}\nspec: {pollInterval: 1m}\n")
            .unwrap_err();
        assert!(err.to_string().contains("spec.pollInterval"));

        let err = projector.config_from_yaml("specs: {}\n").unwrap_err();
        assert!(err.to_string().contains("specs"));
    }

    #[test]
    fn test_merge_state_keeps_user_only() {
        let descriptor = widget();
        let projector = SchemaProjector::new(&descriptor);
        let prior = mixed_config()
            .with("field_manager", "team-a")
            .with("force_conflicts", true)
            .with("id", "stale");
        let fetched = TypedConfig::new()
            .with("metadata", metadata("w1", "ns1"))
            .with("spec", TypedObject::new().with("poll_interval", "2m"));

        let merged = projector.merge_state(&prior, fetched);
        assert_eq!(merged.get("field_manager").as_str(), Some("team-a"));
        assert_eq!(merged.get("force_conflicts").as_bool(), Some(true));
        assert!(merged.get("id").is_unset());
        assert_eq!(merged.lookup("spec.poll_interval").as_str(), Some("2m"));
        assert!(merged.lookup("spec.replicas").is_unset());
    }
}
