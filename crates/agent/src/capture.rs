// SPDX-License-Identifier: MIT

//! UDP and raw-L2 read loops (spec.md §4.2.1/§4.2.2): decode, dedupe
//! locally, and hand fresh observations off for shipping.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use wol_core::decoder::decode_magic_payload;
use wol_core::mac::MacAddress;

use crate::shipping::Observation;
use crate::state::AgentState;

/// Per-datagram evidence of where a magic packet arrived from, carried
/// alongside the decoded MAC to the shipping stage.
pub struct Sighting {
    pub mac: MacAddress,
    pub observation: Observation,
}

/// Read loop for one bound UDP port. Blocks on `recv_from` with a 1s
/// deadline so cancellation is observed promptly even with no traffic.
pub async fn udp_read_loop(
    socket: Arc<UdpSocket>,
    port: u16,
    sink: mpsc::UnboundedSender<Sighting>,
    token: CancellationToken,
) {
    let mut buf = vec![0u8; 2048];
    loop {
        let recv = tokio::time::timeout(Duration::from_secs(1), socket.recv_from(&mut buf));
        tokio::select! {
            _ = token.cancelled() => {
                trace!(port, "UDP read loop exiting");
                return;
            }
            result = recv => {
                let Ok(Ok((n, from))) = result else { continue };
                let Some(mac) = decode_magic_payload(&buf[..n]) else {
                    trace!(port, %from, "dropped non-magic UDP datagram");
                    continue;
                };
                let sighting = Sighting {
                    mac,
                    observation: Observation {
                        source_ip: from.ip(),
                        source_port: port_of(from),
                        packet_size: n as u32,
                    },
                };
                if sink.send(sighting).is_err() {
                    return;
                }
            }
        }
    }
}

fn port_of(addr: SocketAddr) -> u32 {
    addr.port() as u32
}

/// Periodically sweep the local dedupe cache (spec.md §4.2.3: 30s interval,
/// 3x TTL eviction horizon).
pub async fn sweep_loop(state: Arc<AgentState>, period: Duration, factor: u32, token: CancellationToken) {
    let mut ticker = interval(period);
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => state.dedupe.sweep(factor),
        }
    }
}

/// Drain the sighting channel: dedupe locally and forward fresh sightings
/// for shipping via `forward`.
pub async fn dedupe_and_forward<F, Fut>(
    mut source: mpsc::UnboundedReceiver<Sighting>,
    state: Arc<AgentState>,
    forward: F,
) where
    F: Fn(MacAddress, Observation) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    while let Some(sighting) = source.recv().await {
        match state.dedupe.observe(sighting.mac, None) {
            wol_core::dedupe::Observation::Fresh => {
                forward(sighting.mac, sighting.observation).await;
            }
            wol_core::dedupe::Observation::Duplicate(()) => {
                trace!(mac = %sighting.mac, "duplicate within local dedupe window, dropped");
            }
        }
    }
}

pub fn warn_raw_capture_unavailable(reason: impl std::fmt::Display) {
    warn!(%reason, "raw L2 capture unavailable, continuing with UDP capture only");
}

#[path = "capture_tests.rs"]
#[cfg(test)]
mod capture_tests;
