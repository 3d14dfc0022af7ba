//! CLI error types with exit code handling
//!
//! Library errors are mapped onto a small set of diagnostics, each with a
//! stable exit code. Server messages are kept verbatim.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;
use crdform_core::CoreError;
use crdform_kube::KubeError;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid arguments (unknown resource type, malformed id)
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration does not match the resource schema
    #[error("Validation failed: {message}")]
    #[diagnostic(code(crdform::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Provider configuration is invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(crdform::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Server-side apply conflict
    #[error("{message}")]
    #[diagnostic(
        code(crdform::cli::conflict),
        help("re-run with --force-conflicts (or set force_conflicts: true) to take ownership")
    )]
    Conflict { message: String },

    /// Object does not exist
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::not_found))]
    NotFound { message: String },

    /// Network operation refused in offline mode
    #[error("{message}")]
    #[diagnostic(
        code(crdform::cli::offline),
        help("drop --offline / CRDFORM_OFFLINE, or use `crdform manifest` to render locally")
    )]
    Offline { message: String },

    /// Transport failure, timeout or API rejection
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::kubernetes))]
    Kubernetes { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdform::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(crdform::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Conflict { .. } => exit_codes::CONFLICT,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Offline { .. } => exit_codes::OFFLINE,
            CliError::Kubernetes { .. } => exit_codes::KUBE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidImportId { .. } => CliError::usage_with_help(
                message,
                format!("import IDs use the format '{}'", crdform_core::IMPORT_ID_FORMAT),
            ),
            CoreError::UnknownResource { .. } => CliError::usage_with_help(
                message,
                "run `crdform resources` to list the available resource types",
            ),
            CoreError::InvalidCoordinates { .. } => CliError::Usage {
                message,
                help: None,
            },
            CoreError::InvalidConfig { .. } | CoreError::DuplicateResource { .. } => {
                CliError::Config {
                    message,
                    help: None,
                }
            }
            CoreError::Io(_) => CliError::Io { message },
            _ => CliError::Validation {
                message,
                help: None,
            },
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        let message = err.to_string();
        match err {
            KubeError::Core(core) => core.into(),
            KubeError::FieldConflict { .. } => CliError::Conflict { message },
            KubeError::NotFound { .. } => CliError::NotFound { message },
            KubeError::OfflineMode { .. } => CliError::Offline { message },
            KubeError::InvalidConfig(_) => CliError::Config {
                message,
                help: Some("check --kubeconfig, --context and the provider configuration file".to_string()),
            },
            KubeError::InvalidState { .. } => CliError::Internal { message },
            _ => CliError::Kubernetes { message },
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Validation {
            message: err.to_string(),
            help: None,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
