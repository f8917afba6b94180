// SPDX-License-Identifier: MIT

use super::*;
use wol_core::mac::MacAddress;

fn obs() -> WolObservation {
    WolObservation {
        mac: MacAddress::parse_lenient("52:54:00:12:34:56").unwrap(),
        timestamp_ms: 1_700_000_000_000,
        node_name: "node-a".into(),
        source_ip: "10.0.0.5".into(),
        source_port: 9,
        packet_size: 102,
    }
}

#[test]
fn observation_round_trips_through_wire_event() {
    let event: WolEvent = obs().into();
    assert_eq!(event.mac_address, "52:54:00:12:34:56");
    let back: WolObservation = event.try_into().unwrap();
    assert_eq!(back, obs());
}

#[test]
fn malformed_mac_on_the_wire_is_rejected() {
    let mut event: WolEvent = obs().into();
    event.mac_address = "not-a-mac".to_string();
    assert!(WolObservation::try_from(event).is_err());
}

#[test]
fn vm_binding_converts_to_vm_info() {
    let binding = VmBinding {
        mac: MacAddress::parse_lenient("52:54:00:12:34:56").unwrap(),
        vm_name: "test-vm".into(),
        namespace: "default".into(),
    };
    let info = VmInfo::from(&binding);
    assert_eq!(info.name, "test-vm");
    assert_eq!(info.namespace, "default");
}

#[test]
fn response_helper_sets_fields() {
    let resp = response(WolStatus::VmStartInitiated, "started", None, 12, false);
    assert_eq!(resp.status, WolStatus::VmStartInitiated as i32);
    assert_eq!(resp.processing_time_ms, 12);
    assert!(!resp.was_duplicate);
}
