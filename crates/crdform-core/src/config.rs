//! Provider configuration
//!
//! Read once when the provider is configured, from
//! `~/.config/crdform/provider.yaml` (or an explicit path), then overridden
//! by environment variables and command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Field manager used when neither the provider nor the resource sets one
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";

pub const ENV_FIELD_MANAGER: &str = "CRDFORM_FIELD_MANAGER";
pub const ENV_FORCE_CONFLICTS: &str = "CRDFORM_FORCE_CONFLICTS";
pub const ENV_OFFLINE: &str = "CRDFORM_OFFLINE";

/// Process-wide provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Default server-side apply field manager
    #[serde(default = "default_field_manager")]
    pub field_manager: String,

    /// Default for taking ownership of conflicting fields
    #[serde(default)]
    pub force_conflicts: bool,

    /// Disable every network operation
    #[serde(default)]
    pub offline: bool,

    /// Kubeconfig file; falls back to the default inference chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Per-request timeout (e.g., "30s")
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,
}

fn default_field_manager() -> String {
    DEFAULT_FIELD_MANAGER.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            field_manager: default_field_manager(),
            force_conflicts: false,
            offline: false,
            kubeconfig: None,
            context: None,
            request_timeout: None,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("crdform").join("provider.yaml"))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(manager) = lookup(ENV_FIELD_MANAGER) {
            self.field_manager = manager;
        }
        if let Some(value) = lookup(ENV_FORCE_CONFLICTS) {
            self.force_conflicts = parse_bool(ENV_FORCE_CONFLICTS, &value)?;
        }
        if let Some(value) = lookup(ENV_OFFLINE) {
            self.offline = parse_bool(ENV_OFFLINE, &value)?;
        }
        // KUBECONFIG may list several files; kube's own loader merges them.
        Ok(())
    }

    /// The field manager must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.field_manager.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "fieldManager must not be empty".to_string(),
            });
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(CoreError::InvalidConfig {
                message: "requestTimeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CoreError::InvalidConfig {
            message: format!("{} must be a boolean, got '{}'", key, other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.field_manager, "crdform");
        assert!(!config.force_conflicts);
        assert!(!config.offline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
fieldManager: platform-team
forceConflicts: true
context: staging
requestTimeout: 30s
"#;
        let config: ProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.field_manager, "platform-team");
        assert!(config.force_conflicts);
        assert!(!config.offline);
        assert_eq!(config.context.as_deref(), Some("staging"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: ProviderConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("provider.yaml");

        let config = ProviderConfig {
            offline: true,
            request_timeout: Some(Duration::from_secs(90)),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = ProviderConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_empty_field_manager() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.yaml");
        std::fs::write(&path, "fieldManager: ''\n").unwrap();

        let err = ProviderConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("fieldManager"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_FIELD_MANAGER, "ci"),
            (ENV_FORCE_CONFLICTS, "true"),
            (ENV_OFFLINE, "1"),
        ]
        .into_iter()
        .collect();

        let mut config = ProviderConfig::default();
        config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.field_manager, "ci");
        assert!(config.force_conflicts);
        assert!(config.offline);
    }

    #[test]
    fn test_env_invalid_bool() {
        let mut config = ProviderConfig::default();
        let err = config
            .apply_env_from(|key| (key == ENV_OFFLINE).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_OFFLINE));
    }

    #[test]
    fn test_kubeconfig_env_left_to_inference() {
        let lookup = |key: &str| {
            (key == "KUBECONFIG").then(|| "/tmp/a.yaml:/tmp/b.yaml".to_string())
        };

        let mut config = ProviderConfig::default();
        config.apply_env_from(lookup).unwrap();
        assert_eq!(config.kubeconfig, None);

        let mut config = ProviderConfig {
            kubeconfig: Some(PathBuf::from("/etc/kube")),
            ..Default::default()
        };
        config.apply_env_from(lookup).unwrap();
        assert_eq!(config.kubeconfig, Some(PathBuf::from("/etc/kube")));
    }
}
