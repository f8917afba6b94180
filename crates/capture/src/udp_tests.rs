// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn binds_and_round_trips_a_datagram() {
    let socket = bind_udp_socket(0).unwrap();
    let local_addr = socket.local_addr().unwrap();

    let sender = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
    sender.send_to(b"hello", local_addr).unwrap();

    let mut buf = [0u8; 16];
    let (n, _from) = socket.recv_from(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"hello");
}

#[tokio::test]
async fn broadcast_is_enabled_on_the_socket() {
    let socket = bind_udp_socket(0).unwrap();
    assert!(socket.broadcast().unwrap());
}
