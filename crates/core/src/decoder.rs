// SPDX-License-Identifier: MIT

//! Magic-packet payload decoding (spec §4.1).
//!
//! Pure functions, no I/O, no state. `decode_magic_payload` is on the
//! capture hot path for every packet the Agent sees, so it is written to
//! be branch-predictable on well-formed input: the common case (length ok,
//! header ok, all 16 groups match) walks the buffer once with no
//! allocation beyond the final [`MacAddress`].

use crate::mac::{is_broadcast_octets, MacAddress};

/// Six `0xFF` bytes plus sixteen repetitions of a 6-byte MAC: `6 + 16*6`.
pub const MAGIC_PAYLOAD_LEN: usize = 102;

const HEADER_LEN: usize = 6;
const GROUP_LEN: usize = 6;
const GROUP_COUNT: usize = 16;

/// Decode a magic-packet payload into its target MAC address.
///
/// Fails if `bytes.len() < 102`, the first 6 bytes aren't all `0xFF`, or any
/// of the 16 subsequent 6-byte groups differs from the first group. Excess
/// trailing bytes beyond the 102 required are ignored.
pub fn decode_magic_payload(bytes: &[u8]) -> Option<MacAddress> {
    if bytes.len() < MAGIC_PAYLOAD_LEN {
        return None;
    }
    if !is_broadcast_octets(&first_group(bytes)) {
        return None;
    }

    let target = group_at(bytes, 0);
    for k in 1..GROUP_COUNT {
        if group_at(bytes, k) != target {
            return None;
        }
    }

    Some(MacAddress::from_bytes(target))
}

pub fn is_broadcast_mac(bytes: &[u8; 6]) -> bool {
    is_broadcast_octets(bytes)
}

fn first_group(bytes: &[u8]) -> [u8; 6] {
    let mut out = [0u8; HEADER_LEN];
    out.copy_from_slice(&bytes[..HEADER_LEN]);
    out
}

/// The `k`-th 6-byte MAC repetition, `k=0..=15`, starting right after the
/// 6-byte `0xFF` header.
fn group_at(bytes: &[u8], k: usize) -> [u8; 6] {
    let start = HEADER_LEN + k * GROUP_LEN;
    let mut out = [0u8; GROUP_LEN];
    out.copy_from_slice(&bytes[start..start + GROUP_LEN]);
    out
}

/// Build a well-formed magic packet payload for a given target MAC —
/// used by tests and by the capture benches.
pub fn build_magic_payload(mac: &MacAddress) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC_PAYLOAD_LEN);
    out.extend_from_slice(&[0xFF; HEADER_LEN]);
    for _ in 0..GROUP_COUNT {
        out.extend_from_slice(&mac.bytes());
    }
    out
}

#[path = "decoder_tests.rs"]
#[cfg(test)]
mod decoder_tests;
