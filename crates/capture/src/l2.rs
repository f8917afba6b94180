// SPDX-License-Identifier: MIT

//! Raw Ethernet (L2) capture (spec.md §4.2.1, Design Notes "raw capture
//! portability").
//!
//! Mirrors the relay pattern real WoL forwarders use: one OS thread per
//! interface reading from a `pnet_datalink` channel, handing decoded MACs
//! back to async code over a channel. A thread per interface rather than a
//! Tokio task because the blocking `rx.next()` call would otherwise starve
//! the runtime; see the read loop below for the same `read_timeout` trick
//! the reference relay uses to keep threads responsive to cancellation.

use async_trait::async_trait;
use pnet_datalink::{self, Channel, Config as DatalinkConfig, NetworkInterface};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use wol_core::decoder::decode_magic_payload;
use wol_core::mac::MacAddress;

use crate::ethernet::{is_wol_frame, parse_ethernet_frame};
use crate::iface::{select_interfaces, IfaceInfo};
use crate::CaptureError;

/// A source of raw-Ethernet WoL observations. Implementations run until
/// `token` is cancelled; `Null` exists so hosts without packet-socket
/// support still come up with a working UDP-only path.
#[async_trait]
pub trait L2Capability: Send + Sync {
    async fn run(
        &self,
        sink: mpsc::UnboundedSender<MacAddress>,
        token: CancellationToken,
    ) -> Result<(), CaptureError>;
}

fn to_iface_info(iface: &NetworkInterface) -> IfaceInfo {
    IfaceInfo {
        name: iface.name.clone(),
        mac: iface.mac.map(|m| m.octets()),
        is_up: iface.is_up(),
        is_loopback: iface.is_loopback(),
        is_broadcast: iface.is_broadcast(),
    }
}

/// Captures broadcast Ethernet frames on every eligible interface via
/// `pnet_datalink`.
pub struct PnetL2Capture;

impl Default for PnetL2Capture {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl L2Capability for PnetL2Capture {
    async fn run(
        &self,
        sink: mpsc::UnboundedSender<MacAddress>,
        token: CancellationToken,
    ) -> Result<(), CaptureError> {
        let all: Vec<NetworkInterface> = pnet_datalink::interfaces();
        let projected: Vec<IfaceInfo> = all.iter().map(to_iface_info).collect();
        let eligible_names: Vec<String> =
            select_interfaces(projected).into_iter().map(|i| i.name).collect();

        let eligible: Vec<NetworkInterface> =
            all.into_iter().filter(|i| eligible_names.contains(&i.name)).collect();
        if eligible.is_empty() {
            return Err(CaptureError::NoInterfaces);
        }

        let mut dl_cfg = DatalinkConfig::default();
        dl_cfg.read_timeout = Some(std::time::Duration::from_millis(100));

        let mut handles = Vec::new();
        for iface in eligible {
            let (_tx, mut rx) = match pnet_datalink::channel(&iface, dl_cfg.clone()) {
                Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
                Ok(_) => {
                    warn!(interface = %iface.name, "unsupported datalink channel type, skipping");
                    continue;
                }
                Err(err) => {
                    warn!(interface = %iface.name, error = %err, "failed to open datalink channel");
                    continue;
                }
            };

            debug!(interface = %iface.name, "listening for raw WoL frames");
            let sink = sink.clone();
            let token = token.clone();
            let iface_name = iface.name.clone();

            let handle = std::thread::spawn(move || loop {
                if token.is_cancelled() {
                    trace!(interface = %iface_name, "capture thread exiting");
                    break;
                }

                let bytes = match rx.next() {
                    Ok(bytes) => bytes,
                    Err(err)
                        if err.kind() == std::io::ErrorKind::TimedOut
                            || err.kind() == std::io::ErrorKind::WouldBlock =>
                    {
                        continue
                    }
                    Err(_) => break,
                };

                let Some(frame) = parse_ethernet_frame(bytes) else { continue };
                if !is_wol_frame(&frame) {
                    continue;
                }
                let Some(mac) = decode_magic_payload(frame.payload) else { continue };
                if sink.send(mac).is_err() {
                    break;
                }
            });
            handles.push(handle);
        }

        if handles.is_empty() {
            return Err(CaptureError::NoInterfaces);
        }

        token.cancelled().await;
        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

#[path = "l2_tests.rs"]
#[cfg(test)]
mod l2_tests;
