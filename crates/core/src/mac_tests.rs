// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn canonical_is_lowercase() {
    let mac = MacAddress::from_bytes([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
    assert_eq!(mac.canonical(), "52:54:00:12:34:56");
}

#[test]
fn parse_lenient_accepts_uppercase_and_whitespace() {
    let mac = MacAddress::parse_lenient(" AA:BB:CC:DD:EE:FF \n").unwrap();
    assert_eq!(mac.canonical(), "aa:bb:cc:dd:ee:ff");
}

#[test]
fn parse_lenient_rejects_wrong_group_count() {
    assert!(MacAddress::parse_lenient("aa:bb:cc").is_err());
}

#[test]
fn parse_lenient_rejects_non_hex() {
    assert!(MacAddress::parse_lenient("zz:bb:cc:dd:ee:ff").is_err());
}

#[test]
fn broadcast_constant_is_broadcast() {
    assert!(MacAddress::BROADCAST.is_broadcast());
    assert!(!MacAddress::from_bytes([0, 0, 0, 0, 0, 0]).is_broadcast());
}

#[test]
fn roundtrips_through_serde_json() {
    let mac = MacAddress::parse_lenient("02:F1:EF:00:00:0B").unwrap();
    let json = serde_json::to_string(&mac).unwrap();
    assert_eq!(json, "\"02:f1:ef:00:00:0b\"");
    let back: MacAddress = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mac);
}
