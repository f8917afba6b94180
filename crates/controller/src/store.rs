// SPDX-License-Identifier: MIT

//! The narrow control-plane interface (Design Note "Interface boundary for
//! the control plane"): typed object list, child-resource (fleet)
//! create-or-update/delete, and status subresource writes. `reconcile.rs`
//! only ever talks to this trait, so its tests run against [`FakeStore`]
//! without a real cluster.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::api::{Api, DynamicObject, Patch, PatchParams};
use kube::core::{ApiResource, GroupVersionKind};
use kube::{Client, ResourceExt};
use thiserror::Error;

use wol_core::config::WolConfigStatus;

use crate::fleet::FIELD_MANAGER;

/// A VM projected down to what discovery needs: identity, labels, and the
/// MAC addresses of its network interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRecord {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub mac_addresses: Vec<String>,
}

/// Observed counts for an agent fleet, read back from its workload status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedFleet {
    pub scheduled: i32,
    pub ready: i32,
    pub available: i32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("kube API error: {0}")]
    Kube(#[from] kube::Error),
    #[error("fleet {0} not found")]
    FleetNotFound(String),
}

#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// List VMs across the given namespaces (empty ⇒ all namespaces),
    /// optionally filtered by a label selector (spec §4.4.3).
    async fn list_vms(
        &self,
        namespaces: &[String],
        label_selector: Option<&str>,
    ) -> Result<Vec<VmRecord>, StoreError>;

    /// Create or update the agent fleet via server-side apply (spec §4.4.2).
    async fn apply_agent_fleet(&self, fleet: DaemonSet) -> Result<(), StoreError>;

    async fn delete_agent_fleet(&self, name: &str) -> Result<(), StoreError>;

    async fn fleet_observed(&self, name: &str) -> Result<Option<ObservedFleet>, StoreError>;

    /// The image of a fleet's single container, if the fleet exists (used
    /// by startup drift detection, spec §4.4.5).
    async fn fleet_image(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Patch the `status` subresource of the named `WolConfig`.
    async fn patch_wolconfig_status(
        &self,
        name: &str,
        status: &WolConfigStatus,
    ) -> Result<(), StoreError>;
}

/// Real control plane, backed by a `kube::Client`. VM discovery goes
/// through `DynamicObject` rather than a typed KubeVirt client: the
/// virtualization API is explicitly out of scope (spec §1), so we only
/// ever need its metadata and the `macAddress` fields nested under
/// `spec.domain.devices.interfaces`.
pub struct KubeStore {
    client: Client,
    namespace: String,
    vm_resource: ApiResource,
}

impl KubeStore {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let gvk = GroupVersionKind::gvk("kubevirt.io", "v1", "VirtualMachine");
        let vm_resource = ApiResource::from_gvk(&gvk);
        Self { client, namespace: namespace.into(), vm_resource }
    }

    fn extract_macs(obj: &DynamicObject) -> Vec<String> {
        obj.data
            .pointer("/spec/template/spec/domain/devices/interfaces")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|iface| iface.get("macAddress").and_then(|m| m.as_str()))
            .map(|s| s.to_string())
            .collect()
    }
}

#[async_trait]
impl ControlPlane for KubeStore {
    async fn list_vms(
        &self,
        namespaces: &[String],
        label_selector: Option<&str>,
    ) -> Result<Vec<VmRecord>, StoreError> {
        let mut targets = namespaces.to_vec();
        if targets.is_empty() {
            targets.push(String::new()); // "" namespace in the loop below means all-namespaces
        }

        let mut out = Vec::new();
        for ns in targets {
            let api: Api<DynamicObject> = if ns.is_empty() {
                Api::all_with(self.client.clone(), &self.vm_resource)
            } else {
                Api::namespaced_with(self.client.clone(), &ns, &self.vm_resource)
            };
            let mut lp = kube::api::ListParams::default();
            if let Some(selector) = label_selector {
                lp = lp.labels(selector);
            }
            let list = match api.list(&lp).await {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!(namespace = %ns, error = %err, "VM list failed; skipping namespace");
                    continue;
                }
            };
            for obj in list.items {
                let name = obj.name_any();
                let namespace = obj.namespace().unwrap_or_else(|| self.namespace.clone());
                let labels = obj.labels().clone();
                let mac_addresses = Self::extract_macs(&obj);
                out.push(VmRecord { name, namespace, labels, mac_addresses });
            }
        }
        Ok(out)
    }

    async fn apply_agent_fleet(&self, fleet: DaemonSet) -> Result<(), StoreError> {
        let ns = fleet.metadata.namespace.clone().unwrap_or_else(|| self.namespace.clone());
        let name = fleet.metadata.name.clone().unwrap_or_default();
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &ns);
        api.patch(&name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(&fleet)).await?;
        Ok(())
    }

    async fn delete_agent_fleet(&self, name: &str) -> Result<(), StoreError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        match api.delete(name, &kube::api::DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn fleet_observed(&self, name: &str) -> Result<Option<ObservedFleet>, StoreError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        match api.get_status(name).await {
            Ok(ds) => {
                let status = ds.status.unwrap_or_default();
                Ok(Some(ObservedFleet {
                    scheduled: status.desired_number_scheduled,
                    ready: status.number_ready,
                    available: status.number_available.unwrap_or(0),
                }))
            }
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn fleet_image(&self, name: &str) -> Result<Option<String>, StoreError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        match api.get(name).await {
            Ok(ds) => Ok(ds
                .spec
                .and_then(|spec| spec.template.spec)
                .and_then(|spec| spec.containers.into_iter().next())
                .and_then(|container| container.image)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn patch_wolconfig_status(
        &self,
        name: &str,
        status: &WolConfigStatus,
    ) -> Result<(), StoreError> {
        let api: Api<crate::crd::WolConfig> = Api::all(self.client.clone());
        let patch = serde_json::json!({ "status": status });
        api.patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch)).await?;
        Ok(())
    }
}

#[path = "store_tests.rs"]
#[cfg(test)]
mod store_tests;
