// SPDX-License-Identifier: MIT

use super::*;
use wol_core::decoder::build_magic_payload;
use wol_core::mac::MacAddress;

fn mac() -> MacAddress {
    MacAddress::parse_lenient("52:54:00:12:34:56").unwrap()
}

fn plain_wol_frame() -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xFF; 6]); // destination: broadcast
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]); // source
    frame.extend_from_slice(&WOL_ETHERTYPE.to_be_bytes());
    frame.extend_from_slice(&build_magic_payload(&mac()));
    frame
}

fn vlan_tagged(inner_ethertype: u16) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xFF; 6]);
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    frame.extend_from_slice(&0x8100u16.to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x0A]); // TCI (VLAN id 10)
    frame.extend_from_slice(&inner_ethertype.to_be_bytes());
    frame.extend_from_slice(&build_magic_payload(&mac()));
    frame
}

#[test]
fn parses_plain_wol_frame() {
    let frame = parse_ethernet_frame(&plain_wol_frame()).unwrap();
    assert_eq!(frame.ethertype, WOL_ETHERTYPE);
    assert_eq!(frame.destination, [0xFF; 6]);
    assert!(is_wol_frame(&frame));
}

#[test]
fn unwraps_vlan_tag_to_reach_wol_ethertype() {
    let bytes = vlan_tagged(WOL_ETHERTYPE);
    let frame = parse_ethernet_frame(&bytes).unwrap();
    assert_eq!(frame.ethertype, WOL_ETHERTYPE);
    assert!(is_wol_frame(&frame));
    assert_eq!(frame.payload, &bytes[18..]);
}

#[test]
fn vlan_tag_with_other_inner_type_is_not_wol() {
    let bytes = vlan_tagged(0x0800); // IPv4
    let frame = parse_ethernet_frame(&bytes).unwrap();
    assert!(!is_wol_frame(&frame));
}

#[test]
fn non_broadcast_destination_is_not_wol() {
    let mut bytes = plain_wol_frame();
    bytes[5] = 0xFE; // not all-0xFF
    let frame = parse_ethernet_frame(&bytes).unwrap();
    assert!(!is_wol_frame(&frame));
}

#[test]
fn too_short_for_header_returns_none() {
    assert!(parse_ethernet_frame(&[0u8; 10]).is_none());
}

#[test]
fn too_short_for_vlan_tag_returns_none() {
    let mut bytes = vec![0xFFu8; 12];
    bytes.extend_from_slice(&0x8100u16.to_be_bytes());
    // Missing the 4 VLAN-tag bytes entirely.
    assert!(parse_ethernet_frame(&bytes).is_none());
}
