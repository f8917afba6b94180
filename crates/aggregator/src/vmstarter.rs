// SPDX-License-Identifier: MIT

//! The adapter seam between the Aggregator's dedupe/dispatch logic and
//! whatever virtualization platform actually owns VM lifecycle (spec.md
//! §4.3 step 4, §9 "run strategy restore dance").

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("failed to start VM {namespace}/{name}: {reason}")]
pub struct VmStartError {
    pub namespace: String,
    pub name: String,
    pub reason: String,
}

/// Starts a VM by namespace/name. Implementations own whatever platform
/// dance (run-strategy restore, power-on API calls, polling) is required;
/// the Aggregator only needs success or failure.
#[async_trait]
pub trait VMStarter: Send + Sync {
    async fn start_vm(&self, namespace: &str, name: &str) -> Result<(), VmStartError>;
}
