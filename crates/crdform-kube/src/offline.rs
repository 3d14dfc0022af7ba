//! Offline mode
//!
//! When enabled, every operation that would reach the API server fails
//! before any I/O. Manifest rendering is local and never gated.

use crate::error::{KubeError, Operation, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfflineGate {
    offline: bool,
}

impl OfflineGate {
    pub fn new(offline: bool) -> Self {
        Self { offline }
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Fail with [`KubeError::OfflineMode`] if `operation` needs the network
    pub fn check(&self, operation: Operation) -> Result<()> {
        if self.offline {
            tracing::debug!(%operation, "blocked by offline mode");
            return Err(KubeError::OfflineMode { operation });
        }
        Ok(())
    }
}
