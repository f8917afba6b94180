// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

fn up(name: &str, mac: Option<[u8; 6]>) -> IfaceInfo {
    IfaceInfo { name: name.to_string(), mac, is_up: true, is_loopback: false, is_broadcast: true }
}

#[parameterized(
    loopback = { "lo" },
    veth = { "veth1234" },
    tap = { "tap0" },
    ovs = { "ovs-system" },
    ovn = { "ovn-k8s-mp0" },
    br_int = { "br-int" },
    vlan_peer = { "eth0@if5" },
)]
fn skips_virtual_or_disallowed_names(name: &str) {
    let iface = up(name, None);
    assert!(select_interfaces(vec![iface]).is_empty(), "{name} should be skipped");
}

#[parameterized(
    ethernet = { "eth0" },
    predictable = { "enp3s0" },
    wifi = { "wlp2s0" },
    bridge = { "br-lan" },
)]
fn includes_eligible_names(name: &str) {
    let iface = up(name, None);
    assert_eq!(select_interfaces(vec![iface.clone()]), vec![iface]);
}

#[test]
fn skips_down_interfaces() {
    let mut iface = up("eth0", None);
    iface.is_up = false;
    assert!(select_interfaces(vec![iface]).is_empty());
}

#[test]
fn skips_non_broadcast_interfaces() {
    let mut iface = up("eth0", None);
    iface.is_broadcast = false;
    assert!(select_interfaces(vec![iface]).is_empty());
}

#[test]
fn skips_loopback_even_if_named_eligible() {
    let mut iface = up("eth0", None);
    iface.is_loopback = true;
    assert!(select_interfaces(vec![iface]).is_empty());
}

#[test]
fn prefers_bridge_over_physical_peer_sharing_a_mac() {
    let shared = [0x52, 0x54, 0x00, 0x12, 0x34, 0x56];
    let physical = up("eth0", Some(shared));
    let bridge = up("br-lan", Some(shared));
    let result = select_interfaces(vec![physical, bridge.clone()]);
    assert_eq!(result, vec![bridge]);
}

#[test]
fn keeps_interfaces_with_distinct_macs() {
    let a = up("eth0", Some([1, 2, 3, 4, 5, 6]));
    let b = up("eth1", Some([9, 8, 7, 6, 5, 4]));
    let result = select_interfaces(vec![a.clone(), b.clone()]);
    assert_eq!(result.len(), 2);
    assert!(result.contains(&a));
    assert!(result.contains(&b));
}
