//! Local manifest rendering for the `_manifest` data sources
//!
//! Rendering never touches the network, so it keeps working in offline mode.

use crate::attr::TypedConfig;
use crate::error::Result;
use crate::projector::SchemaProjector;
use crate::schema::ResourceDescriptor;

/// Render one configuration as a YAML manifest
pub fn render_manifest(descriptor: &ResourceDescriptor, config: &TypedConfig) -> Result<String> {
    SchemaProjector::new(descriptor).encode(config)?.to_yaml()
}

/// Render several configurations as a multi-document YAML stream
pub fn render_manifests<'a>(
    items: impl IntoIterator<Item = (&'a ResourceDescriptor, &'a TypedConfig)>,
) -> Result<String> {
    let documents = items
        .into_iter()
        .map(|(descriptor, config)| render_manifest(descriptor, config))
        .collect::<Result<Vec<_>>>()?;
    Ok(documents.join("---\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Attr, TypedObject};
    use crate::catalog::Catalog;

    fn ruler_config() -> TypedConfig {
        TypedConfig::new()
            .with(
                "metadata",
                TypedObject::new()
                    .with("name", "cfg1")
                    .with("namespace", "ns1")
                    .with("labels", Attr::map([("team", Attr::string("obs"))])),
            )
            .with(
                "spec",
                TypedObject::new()
                    .with("poll_interval", "1m")
                    .with("evaluation_interval", "30s"),
            )
    }

    fn exit_node() -> TypedConfig {
        TypedConfig::new()
            .with(
                "metadata",
                TypedObject::new().with("name", "exit").with("namespace", "tunnels"),
            )
            .with(
                "spec",
                TypedObject::new()
                    .with("host", "exit.example.com")
                    .with("port", 9090i64)
                    .with("default_route", true)
                    .with("chisel_image", Attr::Null),
            )
    }

    #[test]
    fn test_render_ruler_config() {
        let catalog = Catalog::builtin();
        let descriptor = catalog.get("crdform_loki_grafana_com_ruler_config_v1").unwrap();
        let yaml = render_manifest(descriptor, &ruler_config()).unwrap();
        insta::assert_snapshot!(yaml, @r"
        apiVersion: loki.grafana.com/v1
        kind: RulerConfig
        metadata:
          labels:
            team: obs
          name: cfg1
          namespace: ns1
        spec:
          evaluationInterval: 30s
          pollInterval: 1m
        ");
    }

    #[test]
    fn test_render_multiple() {
        let catalog = Catalog::builtin();
        let ruler = catalog.get("crdform_loki_grafana_com_ruler_config_v1").unwrap();
        let exit = catalog.get("crdform_chisel_operator_io_exit_node_v1").unwrap();
        let ruler_config = ruler_config();
        let exit_config = exit_node();

        let yaml = render_manifests([(ruler, &ruler_config), (exit, &exit_config)]).unwrap();
        insta::assert_snapshot!(yaml, @r"
        apiVersion: loki.grafana.com/v1
        kind: RulerConfig
        metadata:
          labels:
            team: obs
          name: cfg1
          namespace: ns1
        spec:
          evaluationInterval: 30s
          pollInterval: 1m
        ---
        apiVersion: chisel-operator.io/v1
        kind: ExitNode
        metadata:
          name: exit
          namespace: tunnels
        spec:
          chisel_image: null
          default_route: true
          host: exit.example.com
          port: 9090
        ");
    }

    #[test]
    fn test_render_missing_required() {
        let catalog = Catalog::builtin();
        let descriptor = catalog.get("crdform_chisel_operator_io_exit_node_v1").unwrap();
        let config = TypedConfig::new().with(
            "metadata",
            TypedObject::new().with("name", "exit").with("namespace", "tunnels"),
        );
        assert!(render_manifest(descriptor, &config).is_err());
    }
}
