// SPDX-License-Identifier: MIT

//! The declarative `WolConfig` object (spec §3) and its validation rules
//! (spec §4.4.1). Kept independent of `kube`/`k8s-openapi` so it can be
//! unit-tested without a control-plane dependency; `wol-controller` wraps
//! [`WolConfigSpec`] in a `#[derive(CustomResource)]` type.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mac::MacAddress;

pub const DEFAULT_WOL_PORT: u16 = 9;
pub const DEFAULT_CACHE_TTL_SECS: u32 = 300;
pub const MAX_WOL_PORTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum DiscoveryMode {
    #[default]
    All,
    LabelSelector,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExplicitMapping {
    pub mac: String,
    pub vm_name: String,
    pub namespace: String,
}

/// Per-fleet pod shape; every field defaults when absent (spec §4.4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct AgentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<String>,
}

impl AgentSpec {
    pub const DEFAULT_REQUEST_CPU: &'static str = "50m";
    pub const DEFAULT_REQUEST_MEMORY: &'static str = "64Mi";
    pub const DEFAULT_LIMIT_CPU: &'static str = "100m";
    pub const DEFAULT_LIMIT_MEMORY: &'static str = "128Mi";
    pub const DEFAULT_MAX_UNAVAILABLE: &'static str = "1";

    pub fn requests_cpu(&self) -> &str {
        self.requests_cpu.as_deref().unwrap_or(Self::DEFAULT_REQUEST_CPU)
    }

    pub fn requests_memory(&self) -> &str {
        self.requests_memory.as_deref().unwrap_or(Self::DEFAULT_REQUEST_MEMORY)
    }

    pub fn limits_cpu(&self) -> &str {
        self.limits_cpu.as_deref().unwrap_or(Self::DEFAULT_LIMIT_CPU)
    }

    pub fn limits_memory(&self) -> &str {
        self.limits_memory.as_deref().unwrap_or(Self::DEFAULT_LIMIT_MEMORY)
    }

    pub fn max_unavailable(&self) -> &str {
        self.max_unavailable.as_deref().unwrap_or(Self::DEFAULT_MAX_UNAVAILABLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WolConfigSpec {
    #[serde(default)]
    pub discovery_mode: DiscoveryMode,
    #[serde(default)]
    pub namespace_selectors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_selector: Option<String>,
    #[serde(default)]
    pub explicit_mappings: Vec<ExplicitMapping>,
    #[serde(default)]
    pub wol_ports: Vec<u16>,
    #[serde(default)]
    pub cache_ttl: u32,
    #[serde(default)]
    pub agent: AgentSpec,
}

impl Default for WolConfigSpec {
    fn default() -> Self {
        WolConfigSpec {
            discovery_mode: DiscoveryMode::All,
            namespace_selectors: Vec::new(),
            vm_selector: None,
            explicit_mappings: Vec::new(),
            wol_ports: Vec::new(),
            cache_ttl: 0,
            agent: AgentSpec::default(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wolPorts[{index}] = {port} is outside 1..=65535")]
    PortOutOfRange { index: usize, port: u16 },
    #[error("wolPorts has {0} entries, maximum is {MAX_WOL_PORTS}")]
    TooManyPorts(usize),
    #[error("cacheTTL must not be negative")]
    NegativeCacheTtl,
    #[error("discoveryMode=LabelSelector requires vmSelector")]
    MissingVmSelector,
    #[error("discoveryMode=Explicit requires at least one entry in explicitMappings")]
    EmptyExplicitMappings,
    #[error("explicitMappings[{index}].mac is not a valid MAC address: {mac}")]
    InvalidExplicitMac { index: usize, mac: String },
}

/// Apply defaults in place and report the first validation failure, if
/// any (spec §4.4.1). Defaulting always happens even when validation later
/// fails, matching "mutates defaults in place" — callers reject based on
/// the returned `Result`, not on the (always-defaulted) struct.
pub fn validate_config(spec: &mut WolConfigSpec) -> Result<(), ValidationError> {
    if spec.wol_ports.is_empty() {
        spec.wol_ports = vec![DEFAULT_WOL_PORT];
    }
    if spec.wol_ports.len() > MAX_WOL_PORTS {
        return Err(ValidationError::TooManyPorts(spec.wol_ports.len()));
    }
    for (index, port) in spec.wol_ports.iter().enumerate() {
        if *port == 0 {
            return Err(ValidationError::PortOutOfRange { index, port: *port });
        }
    }

    // cacheTTL is unsigned at the wire layer; "negative" is surfaced by
    // rejecting a raw i64 before it reaches this type, see `parse_cache_ttl`.
    if spec.cache_ttl == 0 {
        spec.cache_ttl = DEFAULT_CACHE_TTL_SECS;
    }

    match spec.discovery_mode {
        DiscoveryMode::LabelSelector => {
            if spec.vm_selector.as_deref().unwrap_or("").is_empty() {
                return Err(ValidationError::MissingVmSelector);
            }
        }
        DiscoveryMode::Explicit => {
            if spec.explicit_mappings.is_empty() {
                return Err(ValidationError::EmptyExplicitMappings);
            }
            for (index, mapping) in spec.explicit_mappings.iter().enumerate() {
                if MacAddress::parse_lenient(&mapping.mac).is_err() {
                    return Err(ValidationError::InvalidExplicitMac {
                        index,
                        mac: mapping.mac.clone(),
                    });
                }
            }
        }
        DiscoveryMode::All => {}
    }

    Ok(())
}

/// Parse a signed `cacheTTL` from the wire/API layer, rejecting negative
/// values before they're coerced into the unsigned `WolConfigSpec` field.
pub fn parse_cache_ttl(raw: i64) -> Result<u32, ValidationError> {
    if raw < 0 {
        return Err(ValidationError::NegativeCacheTtl);
    }
    Ok(raw as u32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct AgentStatus {
    #[serde(default)]
    pub scheduled: i32,
    #[serde(default)]
    pub ready: i32,
    #[serde(default)]
    pub available: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WolCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

impl WolCondition {
    pub const READY: &'static str = "Ready";

    pub fn ready(status: bool, reason: &str, message: impl Into<String>) -> Self {
        WolCondition {
            type_: Self::READY.to_string(),
            status: if status { "True" } else { "False" }.to_string(),
            reason: reason.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct WolConfigStatus {
    #[serde(default)]
    pub managed_vms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub conditions: Vec<WolCondition>,
    #[serde(default)]
    pub agent_status: AgentStatus,
}

impl WolConfigStatus {
    /// Insert-or-replace the single `Ready` condition entry (spec §4.4.6:
    /// "a single-instance entry in status.conditions keyed by type=Ready").
    pub fn set_ready(&mut self, status: bool, reason: &str, message: impl Into<String>) {
        let condition = WolCondition::ready(status, reason, message);
        if let Some(existing) = self.conditions.iter_mut().find(|c| c.type_ == WolCondition::READY)
        {
            *existing = condition;
        } else {
            self.conditions.push(condition);
        }
    }

    pub fn ready_condition(&self) -> Option<&WolCondition> {
        self.conditions.iter().find(|c| c.type_ == WolCondition::READY)
    }
}

#[path = "config_tests.rs"]
#[cfg(test)]
mod config_tests;
