// SPDX-License-Identifier: MIT

//! Interface selection for raw L2 capture (spec.md §4.2.2).
//!
//! Kept as pure logic over a small [`IfaceInfo`] projection so the filter
//! and dedup rules are unit-testable without real network interfaces;
//! [`l2`](crate::l2) adapts `pnet_datalink::NetworkInterface` into this
//! shape.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfaceInfo {
    pub name: String,
    pub mac: Option<[u8; 6]>,
    pub is_up: bool,
    pub is_loopback: bool,
    pub is_broadcast: bool,
}

#[allow(clippy::expect_used)]
fn virtual_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(veth|tap|ovs-|ovn-)|^br-int$|@if").expect("static pattern is valid")
    })
}

#[allow(clippy::expect_used)]
fn eligible_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(en|eth|wlp|br-)").expect("static pattern is valid"))
}

fn is_virtual(name: &str) -> bool {
    virtual_pattern().is_match(name)
}

fn is_eligible_name(name: &str) -> bool {
    eligible_pattern().is_match(name)
}

/// Apply the filter (loopback/down/non-broadcast/virtual skip, name
/// allowlist) and then dedup by MAC, preferring the bridge (`br-*`) over
/// its physical peer when two interfaces share a MAC.
pub fn select_interfaces(interfaces: Vec<IfaceInfo>) -> Vec<IfaceInfo> {
    let mut filtered: Vec<IfaceInfo> = interfaces
        .into_iter()
        .filter(|iface| {
            !iface.is_loopback
                && iface.is_up
                && iface.is_broadcast
                && !is_virtual(&iface.name)
                && is_eligible_name(&iface.name)
        })
        .collect();

    filtered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut by_mac: Vec<IfaceInfo> = Vec::new();
    for iface in filtered.drain(..) {
        match iface.mac {
            None => by_mac.push(iface),
            Some(mac) => {
                if let Some(existing_idx) = by_mac.iter().position(|i| i.mac == Some(mac)) {
                    let existing_is_bridge = by_mac[existing_idx].name.starts_with("br-");
                    let candidate_is_bridge = iface.name.starts_with("br-");
                    if candidate_is_bridge && !existing_is_bridge {
                        by_mac[existing_idx] = iface;
                    }
                    // otherwise keep whichever is already recorded
                } else {
                    by_mac.push(iface);
                }
            }
        }
    }

    by_mac
}

#[path = "iface_tests.rs"]
#[cfg(test)]
mod iface_tests;
