// SPDX-License-Identifier: MIT

//! Merges every `WolConfig`'s discovery mode into one set of `VmBinding`s
//! (spec §4.4.3, Design Note "Merged-config OR semantics", spec §8
//! property 2). Pure function over a `ControlPlane` — no mutable state of
//! its own — so `reconcile.rs` can call it fresh on every reconcile.

use wol_core::config::{DiscoveryMode, WolConfigSpec};
use wol_core::mac::MacAddress;
use wol_core::mapping::VmBinding;

use crate::store::{ControlPlane, StoreError};

/// Discover the bindings contributed by a single validated `WolConfigSpec`.
/// Ordering within the returned vector has no significance on its own;
/// callers OR-merge across configs by installing all of them into one
/// [`wol_core::mapping::MappingTable`], which collapses by MAC.
pub async fn bindings_for_config(
    store: &dyn ControlPlane,
    spec: &WolConfigSpec,
) -> Result<Vec<VmBinding>, StoreError> {
    match spec.discovery_mode {
        DiscoveryMode::Explicit => Ok(spec
            .explicit_mappings
            .iter()
            .filter_map(|mapping| {
                MacAddress::parse_lenient(&mapping.mac).ok().map(|mac| VmBinding {
                    mac,
                    vm_name: mapping.vm_name.clone(),
                    namespace: mapping.namespace.clone(),
                })
            })
            .collect()),
        DiscoveryMode::All => {
            let vms = store.list_vms(&spec.namespace_selectors, None).await?;
            Ok(bindings_from_vms(vms))
        }
        DiscoveryMode::LabelSelector => {
            let selector = spec.vm_selector.as_deref().unwrap_or("");
            let vms = store.list_vms(&spec.namespace_selectors, Some(selector)).await?;
            Ok(bindings_from_vms(vms))
        }
    }
}

fn bindings_from_vms(vms: Vec<crate::store::VmRecord>) -> Vec<VmBinding> {
    let mut out = Vec::new();
    for vm in &vms {
        for mac in &vm.mac_addresses {
            if let Ok(mac) = MacAddress::parse_lenient(mac) {
                out.push(VmBinding { mac, vm_name: vm.name.clone(), namespace: vm.namespace.clone() });
            }
        }
    }
    out
}

#[path = "discovery_tests.rs"]
#[cfg(test)]
mod discovery_tests;
