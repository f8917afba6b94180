// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("failed to build kube client: {0}")]
    KubeClient(#[source] kube::Error),
    #[error("health server failed: {0}")]
    HealthServer(#[source] std::io::Error),
}
