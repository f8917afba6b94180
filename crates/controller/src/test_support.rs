// SPDX-License-Identifier: MIT

//! In-memory [`ControlPlane`] fake (Design Note "Interface boundary for
//! the control plane"). Gated behind `#[cfg(any(test, feature =
//! "test-support"))]` so both this crate's unit tests and the workspace's
//! end-to-end scenario tests can drive the reconciler without a real
//! cluster.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use parking_lot::Mutex;

use wol_core::config::WolConfigStatus;

use crate::store::{ControlPlane, ObservedFleet, StoreError, VmRecord};

#[derive(Default)]
pub struct FakeStore {
    vms: Mutex<Vec<VmRecord>>,
    fleets: Mutex<BTreeMap<String, DaemonSet>>,
    observed: Mutex<BTreeMap<String, ObservedFleet>>,
    statuses: Mutex<BTreeMap<String, WolConfigStatus>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_vms(&self, vms: Vec<VmRecord>) {
        *self.vms.lock() = vms;
    }

    pub fn seed_observed_fleet(&self, name: &str, observed: ObservedFleet) {
        self.observed.lock().insert(name.to_string(), observed);
    }

    pub fn fleets(&self) -> Vec<DaemonSet> {
        self.fleets.lock().values().cloned().collect()
    }

    pub fn fleet_names(&self) -> Vec<String> {
        self.fleets.lock().keys().cloned().collect()
    }

    pub fn status_of(&self, config_name: &str) -> Option<WolConfigStatus> {
        self.statuses.lock().get(config_name).cloned()
    }
}

#[async_trait]
impl ControlPlane for FakeStore {
    async fn list_vms(
        &self,
        namespaces: &[String],
        label_selector: Option<&str>,
    ) -> Result<Vec<VmRecord>, StoreError> {
        let vms = self.vms.lock();
        Ok(vms
            .iter()
            .filter(|vm| namespaces.is_empty() || namespaces.contains(&vm.namespace))
            .filter(|vm| match label_selector {
                None => true,
                Some(selector) => selector.split(',').all(|clause| {
                    let clause = clause.trim();
                    match clause.split_once('=') {
                        Some((k, v)) => vm.labels.get(k).map(|found| found == v).unwrap_or(false),
                        None => false,
                    }
                }),
            })
            .cloned()
            .collect())
    }

    async fn apply_agent_fleet(&self, fleet: DaemonSet) -> Result<(), StoreError> {
        let name = fleet.metadata.name.clone().unwrap_or_default();
        self.fleets.lock().insert(name, fleet);
        Ok(())
    }

    async fn delete_agent_fleet(&self, name: &str) -> Result<(), StoreError> {
        self.fleets.lock().remove(name);
        self.observed.lock().remove(name);
        Ok(())
    }

    async fn fleet_observed(&self, name: &str) -> Result<Option<ObservedFleet>, StoreError> {
        Ok(self.observed.lock().get(name).copied())
    }

    async fn fleet_image(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .fleets
            .lock()
            .get(name)
            .and_then(|ds| ds.spec.clone())
            .and_then(|spec| spec.template.spec)
            .and_then(|spec| spec.containers.into_iter().next())
            .and_then(|container| container.image))
    }

    async fn patch_wolconfig_status(
        &self,
        name: &str,
        status: &WolConfigStatus,
    ) -> Result<(), StoreError> {
        self.statuses.lock().insert(name.to_string(), status.clone());
        Ok(())
    }
}
