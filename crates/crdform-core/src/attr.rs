//! Typed configuration model with presence semantics
//!
//! Every attribute is in one of three states:
//! - [`Attr::Unset`]: not configured at all (omitted from the wire)
//! - [`Attr::Null`]: explicitly null
//! - [`Attr::Value`]: a known value
//!
//! Empty lists and maps are `Value`s, distinct from `Unset`.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// An attribute with presence state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Attr {
    #[default]
    Unset,
    Null,
    Value(AttrValue),
}

/// A known attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    /// Elements are never `Unset`; [`Attr::list`] stores unset elements as `Null`
    List(Vec<Attr>),
    /// Entries are never `Unset`; [`Attr::map`] drops them
    Map(BTreeMap<String, Attr>),
    Object(TypedObject),
    Dynamic(JsonValue),
}

impl Attr {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(AttrValue::String(value.into()))
    }

    pub fn int64(value: i64) -> Self {
        Self::Value(AttrValue::Int64(value))
    }

    pub fn float64(value: f64) -> Self {
        Self::Value(AttrValue::Float64(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::Value(AttrValue::Bool(value))
    }

    /// A list has no holes, so unset elements become `Null`
    pub fn list(items: impl IntoIterator<Item = Attr>) -> Self {
        Self::Value(AttrValue::List(
            items
                .into_iter()
                .map(|item| if item.is_unset() { Attr::Null } else { item })
                .collect(),
        ))
    }

    /// Unset entries are dropped, like [`TypedObject::set`] does
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Attr)>) -> Self {
        Self::Value(AttrValue::Map(
            entries
                .into_iter()
                .filter(|(_, v)| !v.is_unset())
                .map(|(k, v)| (k.into(), v))
                .collect(),
        ))
    }

    pub fn object(object: TypedObject) -> Self {
        Self::Value(AttrValue::Object(object))
    }

    pub fn dynamic(value: JsonValue) -> Self {
        Self::Value(AttrValue::Dynamic(value))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Value(AttrValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Value(AttrValue::Int64(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&TypedObject> {
        match self {
            Self::Value(AttrValue::Object(o)) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut TypedObject> {
        match self {
            Self::Value(AttrValue::Object(o)) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Self::int64(value)
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<TypedObject> for Attr {
    fn from(value: TypedObject) -> Self {
        Self::object(value)
    }
}

static UNSET: Attr = Attr::Unset;

/// An object keyed by configuration-facing attribute names
///
/// Attributes that are not stored read back as [`Attr::Unset`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedObject {
    fields: BTreeMap<String, Attr>,
}

impl TypedObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute; setting `Unset` removes it
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Attr>) {
        let name = name.into();
        match value.into() {
            Attr::Unset => {
                self.fields.remove(&name);
            }
            value => {
                self.fields.insert(name, value);
            }
        }
    }

    pub fn get(&self, name: &str) -> &Attr {
        self.fields.get(name).unwrap_or(&UNSET)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attr> {
        self.fields.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Attr {
        self.fields.remove(name).unwrap_or_default()
    }

    /// Follow a dotted path of nested objects (e.g. `spec.poll_interval`)
    pub fn lookup(&self, path: &str) -> &Attr {
        let mut parts = path.split('.');
        let Some(first) = parts.next() else {
            return &UNSET;
        };
        let mut current = self.get(first);
        for part in parts {
            match current.as_object() {
                Some(object) => current = object.get(part),
                None => return &UNSET,
            }
        }
        current
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attr)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Resource-level configuration: the root object of one resource instance
pub type TypedConfig = TypedObject;
