// SPDX-License-Identifier: MIT

//! Canonical MAC address representation.
//!
//! All mapping keys are lowercase, whitespace-stripped `xx:xx:xx:xx:xx:xx`
//! strings (Invariant 1). [`MacAddress`] is the single place that format is
//! produced and parsed so every other module can treat it as opaque.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A lowercase, canonically formatted Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MacParseError {
    #[error("invalid MAC address: {0:?}")]
    Malformed(String),
}

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);

    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        is_broadcast_octets(&self.0)
    }

    /// Lowercase, whitespace-stripped canonical form, e.g. `52:54:00:12:34:56`.
    pub fn canonical(&self) -> String {
        format!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }

    /// Parse a MAC written in any common case/separator convention, but
    /// require it to look like six colon-separated hex octets once
    /// surrounding whitespace is stripped.
    pub fn parse_lenient(s: &str) -> Result<Self, MacParseError> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() != 6 {
            return Err(MacParseError::Malformed(s.to_string()));
        }
        let mut out = [0u8; 6];
        for (i, p) in parts.iter().enumerate() {
            if p.len() != 2 {
                return Err(MacParseError::Malformed(s.to_string()));
            }
            out[i] = u8::from_str_radix(p, 16).map_err(|_| MacParseError::Malformed(s.to_string()))?;
        }
        Ok(MacAddress(out))
    }
}

pub(crate) fn is_broadcast_octets(bytes: &[u8; 6]) -> bool {
    bytes.iter().all(|b| *b == 0xFF)
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_lenient(&value)
    }
}

impl From<MacAddress> for String {
    fn from(value: MacAddress) -> Self {
        value.canonical()
    }
}

#[path = "mac_tests.rs"]
#[cfg(test)]
mod mac_tests;
