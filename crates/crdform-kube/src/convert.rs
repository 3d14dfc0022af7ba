//! Conversions between [`UnstructuredDocument`] and kube's `DynamicObject`
//!
//! Both types are foreign to this crate, so these are free functions rather
//! than `From` impls.

use kube::api::DynamicObject;

use crate::error::Result;
use crdform_core::{CoreError, UnstructuredDocument};

/// Convert a document into a `DynamicObject` for use with `Api<DynamicObject>`
pub fn to_dynamic_object(doc: &UnstructuredDocument) -> Result<DynamicObject> {
    serde_json::from_value(doc.inner().clone()).map_err(|e| CoreError::Json(e).into())
}

/// Convert a `DynamicObject` back into a document
pub fn from_dynamic_object(obj: &DynamicObject) -> Result<UnstructuredDocument> {
    serde_json::to_value(obj)
        .map(UnstructuredDocument::from)
        .map_err(|e| CoreError::Json(e).into())
}
