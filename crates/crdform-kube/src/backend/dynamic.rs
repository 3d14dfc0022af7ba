//! kube-rs backend
//!
//! Requests are built against the resource's collection path, so any CRD
//! works without generated types. Response bodies go through
//! [`UnstructuredDocument::parse`] so malformed payloads carry a byte offset.

use async_trait::async_trait;
use kube::api::{DeleteParams, GetParams, Patch, PatchParams, PropagationPolicy};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::Request;
use kube::{Client, Config};

use super::ClusterBackend;
use crate::apply::ApplyRequest;
use crate::error::{KubeError, Result};
use crdform_core::{ProviderConfig, ResourceCoordinates, UnstructuredDocument};

/// Backend over a live `kube::Client`
#[derive(Clone)]
pub struct DynamicBackend {
    client: Client,
}

impl DynamicBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from provider configuration
    ///
    /// An explicit kubeconfig path wins; otherwise the default inference
    /// chain is used (`KUBECONFIG`, `~/.kube/config`, in-cluster).
    pub async fn from_config(config: &ProviderConfig) -> Result<Self> {
        let options = KubeConfigOptions {
            context: config.context.clone(),
            cluster: None,
            user: None,
        };

        let kube_config = match (&config.kubeconfig, &config.context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    KubeError::InvalidConfig(format!(
                        "failed to read kubeconfig from {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| {
                        KubeError::InvalidConfig(format!(
                            "failed to create Kubernetes config: {}",
                            e
                        ))
                    })?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options).await.map_err(|e| {
                KubeError::InvalidConfig(format!("failed to create Kubernetes config: {}", e))
            })?,
            (None, None) => Config::infer().await.map_err(|e| {
                KubeError::InvalidConfig(format!("failed to infer Kubernetes config: {}", e))
            })?,
        };

        let client = Client::try_from(kube_config).map_err(|e| {
            KubeError::InvalidConfig(format!("failed to create Kubernetes client: {}", e))
        })?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn build_error(e: kube::core::request::Error) -> KubeError {
    KubeError::InvalidConfig(format!("failed to build request: {}", e))
}

#[async_trait]
impl ClusterBackend for DynamicBackend {
    async fn get(&self, coords: &ResourceCoordinates) -> Result<UnstructuredDocument> {
        tracing::debug!(%coords, "GET");
        let request = Request::new(coords.collection_path())
            .get(&coords.name, &GetParams::default())
            .map_err(build_error)?;
        let body = self
            .client
            .request_text(request)
            .await
            .map_err(|e| KubeError::from_kube(coords, e))?;
        Ok(UnstructuredDocument::parse(body.as_bytes())?)
    }

    async fn apply(
        &self,
        coords: &ResourceCoordinates,
        request: &ApplyRequest,
    ) -> Result<UnstructuredDocument> {
        let mut params = PatchParams::apply(request.field_manager());
        params.force = request.force_conflicts();

        tracing::debug!(
            %coords,
            field_manager = request.field_manager(),
            force = request.force_conflicts(),
            "PATCH (server-side apply)"
        );
        let http_request = Request::new(coords.collection_path())
            .patch(
                &coords.name,
                &params,
                &Patch::Apply(request.document().inner()),
            )
            .map_err(build_error)?;
        let body = self
            .client
            .request_text(http_request)
            .await
            .map_err(|e| KubeError::from_kube(coords, e))?;
        Ok(UnstructuredDocument::parse(body.as_bytes())?)
    }

    async fn delete(&self, coords: &ResourceCoordinates) -> Result<()> {
        tracing::debug!(%coords, "DELETE");
        let params = DeleteParams {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Default::default()
        };
        let request = Request::new(coords.collection_path())
            .delete(&coords.name, &params)
            .map_err(build_error)?;
        self.client
            .request_text(request)
            .await
            .map_err(|e| KubeError::from_kube(coords, e))?;
        Ok(())
    }
}
