//! Provider handle
//!
//! Built once from [`ProviderConfig`] and shared read-only by every
//! resource and data source. All network calls go through
//! [`Provider::backend`] (the offline gate) and [`Provider::call`] (the
//! per-request timeout).

use std::future::Future;
use std::sync::Arc;

use crate::backend::{ClusterBackend, DynamicBackend};
use crate::error::{KubeError, Operation, Result};
use crate::offline::OfflineGate;
use crdform_core::ProviderConfig;

pub struct Provider {
    config: ProviderConfig,
    gate: OfflineGate,
    backend: Option<Arc<dyn ClusterBackend>>,
}

impl Provider {
    /// Validate configuration and connect
    ///
    /// In offline mode no Kubernetes client is created.
    pub async fn configure(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        if config.offline {
            tracing::info!("offline mode enabled, no Kubernetes client created");
            return Ok(Self {
                gate: OfflineGate::new(true),
                config,
                backend: None,
            });
        }

        let backend = DynamicBackend::from_config(&config).await?;
        tracing::info!(
            field_manager = %config.field_manager,
            context = config.context.as_deref().unwrap_or("default"),
            "provider configured"
        );
        Self::with_backend(config, Arc::new(backend))
    }

    /// Use an existing backend (tests, custom clients)
    ///
    /// The offline gate still applies.
    pub fn with_backend(config: ProviderConfig, backend: Arc<dyn ClusterBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: OfflineGate::new(config.offline),
            config,
            backend: Some(backend),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn is_offline(&self) -> bool {
        self.gate.is_offline()
    }

    pub fn gate(&self) -> OfflineGate {
        self.gate
    }

    /// A non-empty per-resource field manager wins over the provider default
    pub fn field_manager_for(&self, field_manager: Option<&str>) -> String {
        field_manager
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.config.field_manager.as_str())
            .to_string()
    }

    pub fn force_conflicts_for(&self, force_conflicts: Option<bool>) -> bool {
        force_conflicts.unwrap_or(self.config.force_conflicts)
    }

    /// The backend for `operation`, after the offline gate
    pub fn backend(&self, operation: Operation) -> Result<&dyn ClusterBackend> {
        self.gate.check(operation)?;
        self.backend.as_deref().ok_or_else(|| {
            KubeError::InvalidConfig("no Kubernetes client configured".to_string())
        })
    }

    /// Await a backend call under the configured request timeout
    ///
    /// On timeout the call's future is dropped, cancelling the request.
    pub async fn call<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.config.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| KubeError::Timeout(format!("{:?}", timeout)))?,
            None => call.await,
        }
    }
}
