// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use wol_core::config::{DiscoveryMode, ExplicitMapping, WolConfigSpec};

use super::*;
use crate::store::VmRecord;
use crate::test_support::FakeStore;

fn base_spec() -> WolConfigSpec {
    WolConfigSpec {
        discovery_mode: DiscoveryMode::All,
        namespace_selectors: vec!["default".to_string()],
        vm_selector: None,
        explicit_mappings: vec![],
        wol_ports: vec![9],
        cache_ttl: 300,
        agent: Default::default(),
    }
}

#[tokio::test]
async fn all_mode_discovers_every_vm_in_the_namespace_set() {
    let store = FakeStore::new();
    store.seed_vms(vec![VmRecord {
        name: "test-vm".to_string(),
        namespace: "default".to_string(),
        labels: BTreeMap::new(),
        mac_addresses: vec!["52:54:00:12:34:56".to_string()],
    }]);

    let bindings = bindings_for_config(&store, &base_spec()).await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].vm_name, "test-vm");
}

#[tokio::test]
async fn label_selector_mode_passes_the_selector_through() {
    let store = FakeStore::new();
    store.seed_vms(vec![
        VmRecord {
            name: "match".to_string(),
            namespace: "default".to_string(),
            labels: [("wol.dev/enabled".to_string(), "true".to_string())].into_iter().collect(),
            mac_addresses: vec!["52:54:00:12:34:56".to_string()],
        },
        VmRecord {
            name: "no-match".to_string(),
            namespace: "default".to_string(),
            labels: BTreeMap::new(),
            mac_addresses: vec!["aa:bb:cc:dd:ee:ff".to_string()],
        },
    ]);

    let mut spec = base_spec();
    spec.discovery_mode = DiscoveryMode::LabelSelector;
    spec.vm_selector = Some("wol.dev/enabled=true".to_string());

    let bindings = bindings_for_config(&store, &spec).await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].vm_name, "match");
}

#[tokio::test]
async fn explicit_mode_never_touches_the_control_plane() {
    let store = FakeStore::new();
    let mut spec = base_spec();
    spec.discovery_mode = DiscoveryMode::Explicit;
    spec.explicit_mappings = vec![ExplicitMapping {
        mac: "02:F1:EF:00:00:0B".to_string(),
        vm_name: "db-primary".to_string(),
        namespace: "production".to_string(),
    }];

    let bindings = bindings_for_config(&store, &spec).await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].vm_name, "db-primary");
    assert_eq!(bindings[0].namespace, "production");
}
