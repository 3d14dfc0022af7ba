//! crdform Core - Types shared by every crdform crate
//!
//! This crate provides the pieces that never touch the network:
//! - `ResourceCoordinates`: group/version/resource plus namespace and name
//! - `ResourceDescriptor`: metadata describing one CRD kind
//! - `TypedConfig`: attribute trees with unset/null/value presence
//! - `UnstructuredDocument`: the JSON objects exchanged with the API server
//! - `SchemaProjector`: conversion between the two
//! - `Catalog`: built-in and user-supplied descriptors
//! - `ProviderConfig`: process-wide provider settings

pub mod attr;
pub mod catalog;
pub mod config;
pub mod coordinates;
pub mod document;
pub mod error;
pub mod import;
pub mod manifest;
pub mod projector;
pub mod schema;

pub use attr::{Attr, AttrValue, TypedConfig, TypedObject};
pub use catalog::Catalog;
pub use config::{DEFAULT_FIELD_MANAGER, ProviderConfig};
pub use coordinates::ResourceCoordinates;
pub use document::UnstructuredDocument;
pub use error::{CoreError, Result};
pub use import::{IMPORT_ID_FORMAT, parse_import_id, resource_id};
pub use manifest::{render_manifest, render_manifests};
pub use projector::{
    FIELD_MANAGER_ATTRIBUTE, FORCE_CONFLICTS_ATTRIBUTE, ID_ATTRIBUTE, SchemaProjector,
    USER_ONLY_ATTRIBUTES, WAIT_FOR_DELETE_ATTRIBUTE,
};
pub use schema::{FieldKind, FieldSchema, ResourceDescriptor, to_camel_case};
