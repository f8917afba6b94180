// SPDX-License-Identifier: MIT

use kube::api::DynamicObject;
use serde_json::json;

use super::*;
use crate::test_support::FakeStore;

#[test]
fn extract_macs_reads_kubevirt_interface_list() {
    let obj: DynamicObject = serde_json::from_value(json!({
        "apiVersion": "kubevirt.io/v1",
        "kind": "VirtualMachine",
        "metadata": { "name": "test-vm", "namespace": "default" },
        "spec": {
            "template": {
                "spec": {
                    "domain": {
                        "devices": {
                            "interfaces": [
                                { "name": "default", "macAddress": "52:54:00:12:34:56" }
                            ]
                        }
                    }
                }
            }
        }
    }))
    .unwrap();

    assert_eq!(KubeStore::extract_macs(&obj), vec!["52:54:00:12:34:56".to_string()]);
}

#[test]
fn extract_macs_is_empty_without_interfaces() {
    let obj: DynamicObject = serde_json::from_value(json!({
        "apiVersion": "kubevirt.io/v1",
        "kind": "VirtualMachine",
        "metadata": { "name": "test-vm", "namespace": "default" },
        "spec": {}
    }))
    .unwrap();

    assert!(KubeStore::extract_macs(&obj).is_empty());
}

#[tokio::test]
async fn fake_store_filters_vms_by_namespace_and_label_selector() {
    let store = FakeStore::new();
    store.seed_vms(vec![
        VmRecord {
            name: "a".to_string(),
            namespace: "default".to_string(),
            labels: [("wol.dev/enabled".to_string(), "true".to_string())].into_iter().collect(),
            mac_addresses: vec!["52:54:00:12:34:56".to_string()],
        },
        VmRecord {
            name: "b".to_string(),
            namespace: "production".to_string(),
            labels: BTreeMap::new(),
            mac_addresses: vec!["02:f1:ef:00:00:0b".to_string()],
        },
    ]);

    let filtered =
        store.list_vms(&["default".to_string()], Some("wol.dev/enabled=true")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "a");

    let all = store.list_vms(&[], None).await.unwrap();
    assert_eq!(all.len(), 2);
}
