// SPDX-License-Identifier: MIT

use clap::Parser;

fn parse_ports(raw: &str) -> Result<u16, String> {
    raw.parse::<u16>().map_err(|_| format!("invalid port: {raw}"))
}

#[derive(Debug, Clone, Parser)]
#[command(name = "wol-agent", about = "Per-node Wake-on-LAN capture agent")]
pub struct AgentArgs {
    /// Kubernetes node name this agent runs on.
    #[arg(long, env = "NODE_NAME")]
    pub node_name: String,

    /// Aggregator gRPC address, e.g. `http://wol-aggregator:7070`.
    #[arg(long, env = "AGGREGATOR_ADDRESS")]
    pub aggregator_address: String,

    /// UDP ports to listen on for magic packets.
    #[arg(long, env = "WOL_PORTS", value_delimiter = ',', default_value = "9", value_parser = parse_ports)]
    pub ports: Vec<u16>,

    /// Disable raw Ethernet (layer-2) capture even if the platform supports it.
    #[arg(long, env = "WOL_DISABLE_RAW_CAPTURE", default_value_t = false)]
    pub disable_raw_capture: bool,

    /// Port for the /healthz, /readyz, and /metrics HTTP surface.
    #[arg(long, env = "HEALTH_PORT", default_value_t = 8080)]
    pub health_port: u16,

    /// Emit logs as JSON instead of the default human-readable format.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}
