// SPDX-License-Identifier: MIT

//! Ships deduplicated observations to the aggregator over RPC (spec.md
//! §4.2.3). Failures are logged and dropped — no retry, a later repeat of
//! the same magic packet re-arms the local dedupe entry.

use std::time::Duration;

use tonic::transport::Channel;
use tracing::{debug, warn};

use wol_core::clock::Clock;
use wol_core::mac::MacAddress;
use wol_proto::{AggregatorClient, WolEvent};

use crate::state::AgentState;

const CALL_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub source_ip: std::net::IpAddr,
    pub source_port: u32,
    pub packet_size: u32,
}

impl Default for Observation {
    /// Raw L2 capture has no UDP source address/port to report; callers
    /// forwarding a bare `MacAddress` from that path use this placeholder.
    fn default() -> Self {
        Observation {
            source_ip: std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
            source_port: 0,
            packet_size: 0,
        }
    }
}

pub async fn ship(
    client: &mut AggregatorClient<Channel>,
    state: &AgentState,
    node_name: &str,
    clock: &impl Clock,
    mac: MacAddress,
    observation: Observation,
) {
    let event = WolEvent {
        mac_address: mac.canonical(),
        timestamp_ms: clock.epoch_ms() as i64,
        node_name: node_name.to_string(),
        source_ip: observation.source_ip.to_string(),
        source_port: observation.source_port,
        packet_size: observation.packet_size,
    };

    let mut request = tonic::Request::new(event);
    request.set_timeout(CALL_DEADLINE);

    match client.report_wol_event(request).await {
        Ok(response) => {
            let status = response.into_inner().status();
            debug!(mac = %mac, ?status, "reported WoL event");
            state.metrics.wol_packets_total.inc();
        }
        Err(err) => {
            warn!(mac = %mac, error = %err, "failed to ship WoL event to aggregator");
            state.metrics.wol_errors_total.inc();
        }
    }
}
