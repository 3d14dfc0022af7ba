//! Server-side apply
//!
//! One PATCH per apply, with content type `application/apply-patch+yaml`.
//! There is no client-side read first: the server merges the document under
//! the field manager and reports ownership conflicts itself.

use crate::error::{KubeError, Operation, Result};
use crate::provider::Provider;
use crdform_core::{ResourceCoordinates, UnstructuredDocument};

/// A document to apply, with the identity it is applied under
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyRequest {
    document: UnstructuredDocument,
    field_manager: String,
    force_conflicts: bool,
}

impl ApplyRequest {
    /// Fails when `field_manager` is empty
    pub fn new(
        document: UnstructuredDocument,
        field_manager: impl Into<String>,
        force_conflicts: bool,
    ) -> Result<Self> {
        let field_manager = field_manager.into();
        if field_manager.trim().is_empty() {
            return Err(KubeError::InvalidConfig(
                "field manager must not be empty".to_string(),
            ));
        }
        Ok(Self {
            document,
            field_manager,
            force_conflicts,
        })
    }

    pub fn document(&self) -> &UnstructuredDocument {
        &self.document
    }

    pub fn field_manager(&self) -> &str {
        &self.field_manager
    }

    pub fn force_conflicts(&self) -> bool {
        self.force_conflicts
    }
}

/// Applies documents through a provider
pub struct ApplyEngine<'a> {
    provider: &'a Provider,
}

impl<'a> ApplyEngine<'a> {
    pub fn new(provider: &'a Provider) -> Self {
        Self { provider }
    }

    /// Build a request, resolving unset overrides from provider defaults
    pub fn request(
        &self,
        document: UnstructuredDocument,
        field_manager: Option<&str>,
        force_conflicts: Option<bool>,
    ) -> Result<ApplyRequest> {
        ApplyRequest::new(
            document,
            self.provider.field_manager_for(field_manager),
            self.provider.force_conflicts_for(force_conflicts),
        )
    }

    /// Apply and return the object as the server stored it
    ///
    /// Fields owned by another manager fail with [`KubeError::FieldConflict`]
    /// unless the request forces conflicts.
    pub async fn apply(
        &self,
        coords: &ResourceCoordinates,
        request: &ApplyRequest,
    ) -> Result<UnstructuredDocument> {
        let backend = self.provider.backend(Operation::Apply)?;
        if request.force_conflicts() {
            tracing::debug!(%coords, field_manager = request.field_manager(), "forcing field ownership");
        }

        let result = self
            .provider
            .call(backend.apply(coords, request))
            .await
            .inspect_err(|e| {
                if let KubeError::FieldConflict { conflicts, .. } = e {
                    tracing::warn!(%coords, conflicts = conflicts.len(), "apply rejected by field conflicts");
                }
            })?;

        tracing::info!(
            %coords,
            field_manager = request.field_manager(),
            resource_version = result.resource_version().unwrap_or_default(),
            "applied"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ClusterBackend, MockCluster};
    use crdform_core::ProviderConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn coords() -> ResourceCoordinates {
        ResourceCoordinates::new("loki.grafana.com", "v1", "rulerconfigs", "ns1", "cfg1")
    }

    fn document(poll_interval: &str) -> UnstructuredDocument {
        UnstructuredDocument(json!({
            "apiVersion": "loki.grafana.com/v1",
            "kind": "RulerConfig",
            "metadata": { "name": "cfg1", "namespace": "ns1" },
            "spec": { "pollInterval": poll_interval },
        }))
    }

    fn provider(cluster: &MockCluster, config: ProviderConfig) -> Provider {
        Provider::with_backend(config, Arc::new(cluster.clone())).unwrap()
    }

    #[test]
    fn test_empty_field_manager_rejected() {
        let err = ApplyRequest::new(document("1m"), "  ", false).unwrap_err();
        assert!(matches!(err, KubeError::InvalidConfig(_)));
    }

    #[test]
    fn test_request_falls_back_to_provider_defaults() {
        let cluster = MockCluster::new();
        let config = ProviderConfig {
            field_manager: "platform".to_string(),
            force_conflicts: true,
            ..Default::default()
        };
        let provider = provider(&cluster, config);
        let engine = ApplyEngine::new(&provider);

        let request = engine.request(document("1m"), None, None).unwrap();
        assert_eq!(request.field_manager(), "platform");
        assert!(request.force_conflicts());

        let request = engine
            .request(document("1m"), Some("team-a"), Some(false))
            .unwrap();
        assert_eq!(request.field_manager(), "team-a");
        assert!(!request.force_conflicts());
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let cluster = MockCluster::new();
        let provider = provider(&cluster, ProviderConfig::default());
        let engine = ApplyEngine::new(&provider);
        let request = engine.request(document("1m"), None, None).unwrap();

        let first = engine.apply(&coords(), &request).await.unwrap();
        let second = engine.apply(&coords(), &request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cluster.operation_counts().applies, 2);
        assert_eq!(cluster.operation_counts().gets, 0);
    }

    #[tokio::test]
    async fn test_conflict_then_force() {
        let cluster = MockCluster::new();
        cluster
            .apply(
                &coords(),
                &ApplyRequest::new(document("1m"), "helm", false).unwrap(),
            )
            .await
            .unwrap();

        let provider = provider(&cluster, ProviderConfig::default());
        let engine = ApplyEngine::new(&provider);

        let request = engine.request(document("5m"), None, None).unwrap();
        let err = engine.apply(&coords(), &request).await.unwrap_err();
        assert!(err.is_conflict());
        let text = err.to_string();
        assert!(text.contains(".spec.pollInterval"));
        assert!(text.contains("helm"));

        let request = engine.request(document("5m"), None, Some(true)).unwrap();
        let doc = engine.apply(&coords(), &request).await.unwrap();
        assert_eq!(doc.get("spec.pollInterval"), Some(&json!("5m")));
    }
}
