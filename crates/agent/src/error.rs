// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("failed to connect to aggregator at {address}: {source}")]
    AggregatorConnect { address: String, #[source] source: tonic::transport::Error },
    #[error("health server failed: {0}")]
    HealthServer(#[source] std::io::Error),
}
