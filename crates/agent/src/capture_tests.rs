// SPDX-License-Identifier: MIT

use super::*;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex as StdMutex;
use std::time::Duration as StdDuration;

use wol_core::mac::MacAddress;

fn sighting(mac: [u8; 6]) -> Sighting {
    Sighting {
        mac: MacAddress::from_bytes(mac),
        observation: Observation {
            source_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
            source_port: 9,
            packet_size: 102,
        },
    }
}

#[tokio::test]
async fn forwards_fresh_and_drops_duplicate_within_local_window() {
    let state = Arc::new(AgentState::new(StdDuration::from_secs(2)));
    let (tx, rx) = mpsc::unbounded_channel();
    let forwarded: Arc<StdMutex<Vec<MacAddress>>> = Arc::new(StdMutex::new(Vec::new()));

    tx.send(sighting([1, 2, 3, 4, 5, 6])).unwrap();
    tx.send(sighting([1, 2, 3, 4, 5, 6])).unwrap();
    drop(tx);

    let recorded = forwarded.clone();
    dedupe_and_forward(rx, state, move |mac, _observation| {
        let recorded = recorded.clone();
        async move {
            recorded.lock().unwrap().push(mac);
        }
    })
    .await;

    assert_eq!(forwarded.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_loop_exits_promptly_on_cancellation() {
    let state = Arc::new(AgentState::new(StdDuration::from_secs(2)));
    let token = CancellationToken::new();
    token.cancel();
    let handle = tokio::spawn(sweep_loop(state, Duration::from_secs(30), 3, token));
    tokio::time::timeout(StdDuration::from_secs(1), handle).await.unwrap().unwrap();
}
