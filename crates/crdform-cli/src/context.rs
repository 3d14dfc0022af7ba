//! Shared command context: provider configuration and the resource catalog

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{CliError, Result};
use crdform_core::{Catalog, ProviderConfig, ResourceDescriptor, SchemaProjector, TypedConfig};
use crdform_kube::Provider;

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Provider configuration file (default: ~/.config/crdform/provider.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Refuse every network operation
    #[arg(long, global = true)]
    pub offline: bool,

    /// Server-side apply field manager
    #[arg(long, global = true, value_name = "NAME")]
    pub field_manager: Option<String>,

    /// Take ownership of fields managed by others
    #[arg(long, global = true)]
    pub force_conflicts: bool,

    /// Kubeconfig file
    #[arg(long, global = true, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[arg(long, global = true, value_name = "NAME")]
    pub context: Option<String>,

    /// Extra resource descriptors (YAML list)
    #[arg(long, global = true, value_name = "FILE")]
    pub schemas: Vec<PathBuf>,
}

pub struct Context {
    pub catalog: Catalog,
    pub config: ProviderConfig,
}

impl Context {
    /// File, then environment, then flags
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => ProviderConfig::load_from(path).map_err(|e| CliError::Config {
                message: format!("{}: {}", path.display(), e),
                help: None,
            })?,
            None => ProviderConfig::load()?,
        };
        config.apply_env()?;

        if args.offline {
            config.offline = true;
        }
        if let Some(manager) = &args.field_manager {
            config.field_manager = manager.clone();
        }
        if args.force_conflicts {
            config.force_conflicts = true;
        }
        if let Some(path) = &args.kubeconfig {
            config.kubeconfig = Some(path.clone());
        }
        if let Some(context) = &args.context {
            config.context = Some(context.clone());
        }
        config.validate()?;

        let mut catalog = Catalog::builtin();
        for path in &args.schemas {
            let added = catalog.extend_from_file(path)?;
            tracing::debug!(path = %path.display(), added, "loaded resource descriptors");
        }

        Ok(Self { catalog, config })
    }

    pub fn descriptor(&self, type_name: &str) -> Result<ResourceDescriptor> {
        Ok(self.catalog.get(type_name)?.clone())
    }

    pub async fn provider(&self) -> Result<Arc<Provider>> {
        Ok(Arc::new(Provider::configure(self.config.clone()).await?))
    }
}

/// Read a configuration file for `descriptor`
pub fn load_config(descriptor: &ResourceDescriptor, path: &std::path::Path) -> Result<TypedConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        message: format!("{}: {}", path.display(), e),
    })?;
    SchemaProjector::new(descriptor)
        .config_from_yaml(&content)
        .map_err(|e| CliError::Validation {
            message: format!("{}: {}", path.display(), e),
            help: Some(format!(
                "run `crdform schema {}` to see the accepted attributes",
                descriptor.type_name()
            )),
        })
}
