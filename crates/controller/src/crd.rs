// SPDX-License-Identifier: MIT

//! The `WolConfig` custom resource (spec §3, §6). Wraps
//! [`wol_core::config::WolConfigSpec`] in a `kube`-aware type: `wol-core`
//! stays free of `kube`/`k8s-openapi` so its validation logic can be
//! unit-tested without a control-plane dependency (see that module's doc
//! comment), and this crate does the wrapping it promises.
//!
//! Per Design Note "duplicate API surface", only this richer kind is
//! exposed; the older `Config` kind from the reference source is not part
//! of the contract.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use wol_core::config::{
    AgentSpec, DiscoveryMode, ExplicitMapping, WolConfigSpec as CoreSpec, WolConfigStatus,
};

/// The `spec` body of a `WolConfig` object. Field-for-field identical to
/// [`CoreSpec`]; kept as a separate type because the `CustomResource`
/// derive must see the struct at its definition site.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "wol.dev",
    version = "v1",
    kind = "WolConfig",
    status = "WolConfigStatus",
    printcolumn = r#"{"name":"Discovery","type":"string","jsonPath":".spec.discovery_mode"}"#,
    printcolumn = r#"{"name":"Wol Port","type":"string","jsonPath":".spec.wol_ports"}"#,
    printcolumn = r#"{"name":"Managed VMs","type":"integer","jsonPath":".status.managed_vms"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
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

impl From<&WolConfigSpec> for CoreSpec {
    fn from(spec: &WolConfigSpec) -> Self {
        CoreSpec {
            discovery_mode: spec.discovery_mode,
            namespace_selectors: spec.namespace_selectors.clone(),
            vm_selector: spec.vm_selector.clone(),
            explicit_mappings: spec.explicit_mappings.clone(),
            wol_ports: spec.wol_ports.clone(),
            cache_ttl: spec.cache_ttl,
            agent: spec.agent.clone(),
        }
    }
}

impl From<CoreSpec> for WolConfigSpec {
    fn from(spec: CoreSpec) -> Self {
        WolConfigSpec {
            discovery_mode: spec.discovery_mode,
            namespace_selectors: spec.namespace_selectors,
            vm_selector: spec.vm_selector,
            explicit_mappings: spec.explicit_mappings,
            wol_ports: spec.wol_ports,
            cache_ttl: spec.cache_ttl,
            agent: spec.agent,
        }
    }
}

#[path = "crd_tests.rs"]
#[cfg(test)]
mod crd_tests;
