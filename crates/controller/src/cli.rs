// SPDX-License-Identifier: MIT

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wol-controller", about = "Aggregator/Controller for the Wake-on-LAN wake pipeline")]
pub struct ControllerArgs {
    /// Port the embedded Aggregator gRPC service listens on.
    #[arg(long, env = "GRPC_PORT", default_value_t = 7070)]
    pub grpc_port: u16,

    /// Port for the /healthz and /metrics HTTP surface.
    #[arg(long, env = "HEALTH_PORT", default_value_t = 8080)]
    pub health_port: u16,

    /// Namespace fleets and the embedded Aggregator's own resources live in.
    #[arg(long, env = "WOL_NAMESPACE", default_value = "wol-system")]
    pub namespace: String,

    /// Expected agent container image, used by startup drift detection.
    /// Unset skips the scan entirely (spec §4.4.5).
    #[arg(long, env = "AGENT_IMAGE")]
    pub agent_image: Option<String>,

    /// Emit logs as JSON instead of the default human-readable format.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}
