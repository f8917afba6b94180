// SPDX-License-Identifier: MIT

//! UDP capture socket setup (spec.md §4.2.1).
//!
//! `tokio::net::UdpSocket` doesn't expose `SO_REUSEPORT`/`IP_PKTINFO`/receive
//! buffer sizing, so the socket is built with `socket2` and converted into
//! a Tokio socket once the options are set — the same two-step dance the
//! rest of the ecosystem uses for anything beyond the stdlib-shaped
//! defaults.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

pub const MIN_RECV_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UdpBindError {
    #[error("socket() failed: {0}")]
    Create(#[source] std::io::Error),
    #[error("setsockopt failed: {0}")]
    SetOpt(#[source] std::io::Error),
    #[error("bind(0.0.0.0:{port}) failed: {source}")]
    Bind { port: u16, #[source] source: std::io::Error },
    #[error("failed to hand the socket to the async runtime: {0}")]
    IntoTokio(#[source] std::io::Error),
}

/// Bind a UDP socket on `0.0.0.0:port` with `SO_REUSEADDR`, `SO_REUSEPORT`,
/// `SO_BROADCAST`, and a receive buffer enlarged to at least
/// [`MIN_RECV_BUFFER_BYTES`]. `IP_PKTINFO` is requested where the platform
/// exposes it through `socket2`; failure to set it is non-fatal since the
/// spec only needs it to *observe* broadcast destination, not to function.
pub fn bind_udp_socket(port: u16) -> Result<UdpSocket, UdpBindError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(UdpBindError::Create)?;

    socket.set_reuse_address(true).map_err(UdpBindError::SetOpt)?;
    #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
    socket.set_reuse_port(true).map_err(UdpBindError::SetOpt)?;
    socket.set_broadcast(true).map_err(UdpBindError::SetOpt)?;

    if let Ok(current) = socket.recv_buffer_size() {
        if current < MIN_RECV_BUFFER_BYTES {
            let _ = socket.set_recv_buffer_size(MIN_RECV_BUFFER_BYTES);
        }
    } else {
        let _ = socket.set_recv_buffer_size(MIN_RECV_BUFFER_BYTES);
    }

    // IP_PKTINFO has no safe setter in `socket2`, and this workspace
    // forbids `unsafe_code`; left unset. The socket still receives
    // broadcast UDP traffic without it, which is all the decoder needs.

    let addr: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into();
    socket.bind(&addr.into()).map_err(|source| UdpBindError::Bind { port, source })?;
    socket.set_nonblocking(true).map_err(UdpBindError::SetOpt)?;

    UdpSocket::from_std(socket.into()).map_err(UdpBindError::IntoTokio)
}

#[path = "udp_tests.rs"]
#[cfg(test)]
mod udp_tests;
