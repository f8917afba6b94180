// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wol-capture: the two WoL capture backends (spec.md §4.2.1/§4.2.2) behind
//! a small capability interface, plus the pure interface-selection and
//! Ethernet/VLAN parsing logic that backs the raw-socket path.
//!
//! Per Design Notes "raw capture portability": the UDP path is always
//! available; raw L2 capture is a capability, with a [`null::NullL2Capture`]
//! standing in on platforms/tests without packet sockets.

pub mod ethernet;
pub mod iface;
pub mod l2;
pub mod null;
pub mod udp;

pub use ethernet::{parse_ethernet_frame, EthernetFrame, WOL_ETHERTYPE};
pub use iface::{select_interfaces, IfaceInfo};
pub use l2::{L2Capability, PnetL2Capture};
pub use null::NullL2Capture;
pub use udp::{bind_udp_socket, UdpBindError};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to bind UDP port {port}: {source}")]
    UdpBind { port: u16, #[source] source: std::io::Error },
    #[error("no suitable interface available for raw capture")]
    NoInterfaces,
    #[error("failed to open datalink channel on {iface}: {reason}")]
    DatalinkOpen { iface: String, reason: String },
    #[error("capture socket closed")]
    Closed,
}
