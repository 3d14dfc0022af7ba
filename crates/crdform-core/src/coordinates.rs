//! Resource identity: group/version/resource plus namespace and name

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Coordinates of exactly one object in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCoordinates {
    /// API group (e.g., "loki.grafana.com"), empty for the core group
    pub group: String,
    /// API version (e.g., "v1")
    pub version: String,
    /// Plural resource name (e.g., "rulerconfigs")
    pub resource: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceCoordinates {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The `apiVersion` string for this resource
    ///
    /// - group "apps", version "v1" -> "apps/v1"
    /// - group "", version "v1" -> "v1" (core API)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// REST path of the namespaced collection
    pub fn collection_path(&self) -> String {
        let prefix = if self.group.is_empty() {
            format!("/api/{}", self.version)
        } else {
            format!("/apis/{}/{}", self.group, self.version)
        };
        format!(
            "{}/namespaces/{}/{}",
            prefix, self.namespace, self.resource
        )
    }

    /// REST path of this object
    pub fn object_path(&self) -> String {
        format!("{}/{}", self.collection_path(), self.name)
    }

    /// Synthetic identifier stored in state: `namespace/name`
    pub fn id(&self) -> String {
        crate::import::resource_id(&self.namespace, &self.name)
    }

    /// Check that name and namespace are usable in a request path
    ///
    /// The API server stays the final authority on naming rules; this only
    /// rejects values that cannot possibly be valid.
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() || self.resource.is_empty() {
            return Err(CoreError::InvalidCoordinates {
                message: format!("{} is missing a version or resource", self),
            });
        }
        check_dns_label("namespace", &self.namespace, false)?;
        check_dns_label("name", &self.name, true)?;
        Ok(())
    }
}

/// Namespaces are RFC 1123 labels; names may be dotted subdomains
fn check_dns_label(field: &str, value: &str, allow_dots: bool) -> Result<()> {
    let invalid = |reason: &str| CoreError::InvalidCoordinates {
        message: format!("{} '{}' {}", field, value, reason),
    };

    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.len() > 253 {
        return Err(invalid("is longer than 253 characters"));
    }

    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_dots && c == '.')
    };
    if !value.chars().all(allowed) {
        return Err(invalid(
            "must consist of lowercase alphanumeric characters, '-' or '.'",
        ));
    }
    if value.starts_with(['-', '.']) || value.ends_with(['-', '.']) {
        return Err(invalid("must start and end with an alphanumeric character"));
    }
    Ok(())
}

impl fmt::Display for ResourceCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {}/{}",
            self.api_version(),
            self.resource,
            self.namespace,
            self.name
        )
    }
}
