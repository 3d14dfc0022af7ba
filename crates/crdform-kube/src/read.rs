//! Reading objects back into state

use crate::error::{Operation, Result};
use crate::provider::Provider;
use crdform_core::{
    Attr, CoreError, ID_ATTRIBUTE, ResourceCoordinates, ResourceDescriptor, SchemaProjector,
    TypedConfig, UnstructuredDocument, resource_id,
};

pub struct ReadProjector<'a> {
    provider: &'a Provider,
}

impl<'a> ReadProjector<'a> {
    pub fn new(provider: &'a Provider) -> Self {
        Self { provider }
    }

    /// Fetch the current object
    ///
    /// Fails with `NotFound` when it does not exist, and `Transport` for
    /// network or authentication failures.
    pub async fn read(&self, coords: &ResourceCoordinates) -> Result<UnstructuredDocument> {
        let backend = self.provider.backend(Operation::Read)?;
        let doc = self.provider.call(backend.get(coords)).await?;
        tracing::debug!(
            %coords,
            resource_version = doc.resource_version().unwrap_or_default(),
            "read"
        );
        Ok(doc)
    }

    /// Decode `doc` into state, keeping user-only attributes from `prior`
    ///
    /// `id` is always derived from the document's namespace and name.
    pub fn read_into(
        descriptor: &ResourceDescriptor,
        prior: &TypedConfig,
        doc: &UnstructuredDocument,
    ) -> Result<TypedConfig> {
        let projector = SchemaProjector::new(descriptor);
        let fetched = projector.decode(doc)?;
        let mut state = projector.merge_state(prior, fetched);

        let namespace = doc.namespace().ok_or_else(|| CoreError::MissingField {
            field: "metadata.namespace".to_string(),
        })?;
        let name = doc.name().ok_or_else(|| CoreError::MissingField {
            field: "metadata.name".to_string(),
        })?;
        state.set(ID_ATTRIBUTE, Attr::string(resource_id(namespace, name)));
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockCluster, MockFailure};
    use crate::error::KubeError;
    use crdform_core::{Catalog, FIELD_MANAGER_ATTRIBUTE, ProviderConfig, TypedObject};
    use serde_json::json;
    use std::sync::Arc;

    fn descriptor() -> ResourceDescriptor {
        Catalog::builtin()
            .get("crdform_loki_grafana_com_ruler_config_v1")
            .unwrap()
            .clone()
    }

    fn server_doc() -> UnstructuredDocument {
        UnstructuredDocument(json!({
            "apiVersion": "loki.grafana.com/v1",
            "kind": "RulerConfig",
            "metadata": {
                "name": "cfg1",
                "namespace": "ns1",
                "uid": "abc",
                "resourceVersion": "7",
                "managedFields": [],
            },
            "spec": { "pollInterval": "1m", "unknownField": true },
            "status": { "conditions": [] },
        }))
    }

    #[test]
    fn test_read_into_derives_id_and_keeps_user_attributes() {
        let prior = TypedConfig::new()
            .with(ID_ATTRIBUTE, "stale/id")
            .with(FIELD_MANAGER_ATTRIBUTE, "team-a");

        let state = ReadProjector::read_into(&descriptor(), &prior, &server_doc()).unwrap();

        assert_eq!(state.get(ID_ATTRIBUTE).as_str(), Some("ns1/cfg1"));
        assert_eq!(state.get(FIELD_MANAGER_ATTRIBUTE).as_str(), Some("team-a"));
        assert_eq!(state.lookup("spec.poll_interval").as_str(), Some("1m"));
        assert!(state.lookup("spec.unknown_field").is_unset());
        assert_eq!(state.lookup("metadata.name").as_str(), Some("cfg1"));
    }

    #[test]
    fn test_read_into_requires_identity() {
        let doc = UnstructuredDocument(json!({
            "apiVersion": "loki.grafana.com/v1",
            "kind": "RulerConfig",
            "metadata": { "name": "cfg1" },
        }));
        let err = ReadProjector::read_into(&descriptor(), &TypedObject::new(), &doc).unwrap_err();
        assert!(err.to_string().contains("metadata.namespace"));
    }

    #[tokio::test]
    async fn test_read_missing_and_transport() {
        let cluster = MockCluster::new();
        let provider =
            Provider::with_backend(ProviderConfig::default(), Arc::new(cluster.clone())).unwrap();
        let reader = ReadProjector::new(&provider);
        let coords = descriptor().coordinates("ns1", "cfg1");

        assert!(reader.read(&coords).await.unwrap_err().is_not_found());

        cluster.set_failure(Some(MockFailure::Status {
            code: 401,
            reason: "Unauthorized".to_string(),
            message: "Unauthorized".to_string(),
        }));
        let err = reader.read(&coords).await.unwrap_err();
        assert!(matches!(err, KubeError::Transport(_)));
    }
}
