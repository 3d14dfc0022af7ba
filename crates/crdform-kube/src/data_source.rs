//! Data sources
//!
//! - [`CrdDataSource`] reads an existing object by namespace and name
//! - [`ManifestDataSource`] renders configuration to YAML without a cluster

use std::sync::Arc;

use crate::error::Result;
use crate::provider::Provider;
use crate::read::ReadProjector;
use crdform_core::{ResourceDescriptor, TypedConfig, render_manifest};

pub struct CrdDataSource {
    descriptor: ResourceDescriptor,
    provider: Arc<Provider>,
}

impl CrdDataSource {
    pub fn new(descriptor: ResourceDescriptor, provider: Arc<Provider>) -> Self {
        Self {
            descriptor,
            provider,
        }
    }

    /// Read the object; a missing object is an error here
    pub async fn read(&self, namespace: &str, name: &str) -> Result<TypedConfig> {
        let coords = self.descriptor.coordinates(namespace, name);
        coords.validate()?;

        let doc = ReadProjector::new(&self.provider).read(&coords).await?;
        ReadProjector::read_into(&self.descriptor, &TypedConfig::new(), &doc)
    }
}

/// Renders manifests locally; never gated by offline mode
pub struct ManifestDataSource {
    descriptor: ResourceDescriptor,
}

impl ManifestDataSource {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn type_name(&self) -> String {
        self.descriptor.manifest_type_name()
    }

    pub fn render(&self, config: &TypedConfig) -> Result<String> {
        Ok(render_manifest(&self.descriptor, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockCluster;
    use crdform_core::{Catalog, ID_ATTRIBUTE, ProviderConfig, TypedObject};

    fn exit_node() -> ResourceDescriptor {
        Catalog::builtin()
            .get("crdform_chisel_operator_io_exit_node_v1")
            .unwrap()
            .clone()
    }

    fn config() -> TypedConfig {
        TypedConfig::new()
            .with(
                "metadata",
                TypedObject::new().with("name", "exit").with("namespace", "tunnels"),
            )
            .with(
                "spec",
                TypedObject::new()
                    .with("host", "exit.example.com")
                    .with("port", 9090i64),
            )
    }

    #[tokio::test]
    async fn test_read_existing_object() {
        let cluster = MockCluster::new();
        let provider = Arc::new(
            Provider::with_backend(ProviderConfig::default(), Arc::new(cluster.clone())).unwrap(),
        );
        let mut resource = crate::resource::CrdResource::new(exit_node());
        resource.configure(provider.clone());
        resource.create(&config()).await.unwrap();

        let source = CrdDataSource::new(exit_node(), provider);
        let state = source.read("tunnels", "exit").await.unwrap();
        assert_eq!(state.get(ID_ATTRIBUTE).as_str(), Some("tunnels/exit"));
        assert_eq!(state.lookup("spec.port").as_i64(), Some(9090));

        assert!(source.read("tunnels", "other").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_read_offline() {
        let cluster = MockCluster::new();
        let config = ProviderConfig {
            offline: true,
            ..Default::default()
        };
        let provider = Arc::new(Provider::with_backend(config, Arc::new(cluster.clone())).unwrap());
        let source = CrdDataSource::new(exit_node(), provider);

        assert!(source.read("tunnels", "exit").await.unwrap_err().is_offline());
        assert_eq!(cluster.operation_counts().total(), 0);
    }

    #[test]
    fn test_manifest_renders_without_provider() {
        let source = ManifestDataSource::new(exit_node());
        assert_eq!(source.type_name(), "crdform_chisel_operator_io_exit_node_v1_manifest");

        let yaml = source.render(&config()).unwrap();
        assert!(yaml.starts_with("apiVersion: chisel-operator.io/v1\nkind: ExitNode\n"));
        assert!(yaml.contains("host: exit.example.com"));
    }
}
