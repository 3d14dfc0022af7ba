//! Error types for crdform-kube

use std::fmt;
use thiserror::Error;

use crdform_core::{CoreError, ResourceCoordinates};

/// Result type for crdform-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Operations that reach the API server, or drive the resource lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Apply,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Apply => "apply",
        };
        f.write_str(name)
    }
}

/// A field claimed by another field manager during server-side apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    /// Field path as reported by the server (e.g., ".spec.pollInterval")
    pub field: String,
    /// Field manager currently owning the field
    pub manager: String,
}

impl fmt::Display for FieldConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' owned by '{}'", self.field, self.manager)
    }
}

fn describe_conflicts(conflicts: &[FieldConflict]) -> String {
    if conflicts.is_empty() {
        return "unknown field".to_string();
    }
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur during Kubernetes operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Server-side apply rejected a field owned by another manager
    #[error("field conflict: {}\n{message}\nHint: set force_conflicts = true to take ownership", describe_conflicts(.conflicts))]
    FieldConflict {
        conflicts: Vec<FieldConflict>,
        message: String,
    },

    /// Object does not exist
    #[error("{coordinates} not found")]
    NotFound { coordinates: String },

    /// Network or authentication failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other API server rejection, message preserved verbatim
    #[error("Kubernetes API error ({code} {reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    /// A network call was attempted while offline
    #[error("cannot {operation} while offline mode is enabled\nHint: disable offline mode, or use a manifest data source to render locally")]
    OfflineMode { operation: Operation },

    /// Malformed response body
    #[error("failed to decode server response at byte {offset}: {message}")]
    Decode { offset: usize, message: String },

    /// Timeout
    #[error("operation timed out after {0}")]
    Timeout(String),

    /// Operation not allowed in the resource's lifecycle state
    #[error("cannot {operation} a resource in state '{state}'")]
    InvalidState { state: String, operation: Operation },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for KubeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Decode { offset, message } => KubeError::Decode { offset, message },
            other => KubeError::Core(other),
        }
    }
}

impl KubeError {
    /// Classify an API server status for a request against `coordinates`
    pub fn from_status(
        coordinates: &ResourceCoordinates,
        code: u16,
        reason: &str,
        message: &str,
    ) -> Self {
        match code {
            404 => KubeError::NotFound {
                coordinates: coordinates.to_string(),
            },
            409 if message.contains("Apply failed with") => KubeError::FieldConflict {
                conflicts: crate::backend::parse_apply_conflicts(message),
                message: message.to_string(),
            },
            401 | 403 => KubeError::Transport(format!("{} ({}): {}", reason, code, message)),
            _ => KubeError::Api {
                code,
                reason: reason.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Classify a kube client error for a request against `coordinates`
    pub fn from_kube(coordinates: &ResourceCoordinates, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => {
                Self::from_status(coordinates, resp.code, &resp.reason, &resp.message)
            }
            kube::Error::BuildRequest(e) => {
                KubeError::InvalidConfig(format!("failed to build request: {}", e))
            }
            other => KubeError::Transport(other.to_string()),
        }
    }

    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::NotFound { .. })
    }

    /// Check if this is a server-side apply ownership conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, KubeError::FieldConflict { .. })
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, KubeError::OfflineMode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn coords() -> ResourceCoordinates {
        ResourceCoordinates::new("loki.grafana.com", "v1", "rulerconfigs", "ns1", "cfg1")
    }

    fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_not_found() {
        let err = KubeError::from_kube(
            &coords(),
            api_error(404, "NotFound", r#"rulerconfigs.loki.grafana.com "cfg1" not found"#),
        );
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ns1/cfg1"));
    }

    #[test]
    fn test_apply_conflict() {
        let message = r#"Apply failed with 1 conflict: conflict with "helm" using loki.grafana.com/v1: .spec.pollInterval"#;
        let err = KubeError::from_kube(&coords(), api_error(409, "Conflict", message));
        match &err {
            KubeError::FieldConflict { conflicts, message: kept } => {
                assert_eq!(
                    conflicts,
                    &[FieldConflict {
                        field: ".spec.pollInterval".to_string(),
                        manager: "helm".to_string(),
                    }]
                );
                assert_eq!(kept, message);
            }
            other => panic!("unexpected error: {other}"),
        }
        let text = err.to_string();
        assert!(text.contains("'.spec.pollInterval' owned by 'helm'"));
        assert!(text.contains(message));
        assert!(text.contains("force_conflicts"));
    }

    #[test]
    fn test_optimistic_lock_conflict_is_not_field_conflict() {
        let err = KubeError::from_kube(
            &coords(),
            api_error(409, "Conflict", "the object has been modified"),
        );
        assert!(!err.is_conflict());
        assert!(matches!(err, KubeError::Api { code: 409, .. }));
    }

    #[test]
    fn test_auth_is_transport() {
        let err = KubeError::from_kube(&coords(), api_error(403, "Forbidden", "denied"));
        assert!(matches!(err, KubeError::Transport(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_other_status_preserved() {
        let message = "spec.pollInterval: Invalid value";
        let err = KubeError::from_kube(&coords(), api_error(422, "Invalid", message));
        assert_eq!(
            err.to_string(),
            format!("Kubernetes API error (422 Invalid): {}", message)
        );
    }

    #[test]
    fn test_core_decode_maps_to_decode() {
        let err: KubeError = CoreError::Decode {
            offset: 12,
            message: "expected value".to_string(),
        }
        .into();
        assert!(matches!(err, KubeError::Decode { offset: 12, .. }));

        let err: KubeError = CoreError::InvalidImportId { id: "x".into() }.into();
        assert!(matches!(err, KubeError::Core(_)));
    }

    #[test]
    fn test_offline_message() {
        let err = KubeError::OfflineMode {
            operation: Operation::Apply,
        };
        assert!(err.is_offline());
        assert!(err.to_string().starts_with("cannot apply while offline"));
    }
}
