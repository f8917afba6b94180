// SPDX-License-Identifier: MIT

//! The `VMStarter` implementation against KubeVirt (Design Note "'Run
//! strategy' restore dance"). Talks to the `VirtualMachine` kind as a
//! `DynamicObject`, same rationale as `store.rs`: the virtualization API
//! is out of scope (spec §1), so there is no typed KubeVirt client in the
//! dependency tree.
//!
//! Modeled as a per-call state machine keyed by VM identity (the
//! `namespace`/`name` arguments), not global state, per the Design Note.

use std::time::Duration;

use kube::api::{Api, DynamicObject, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::Client;
use serde_json::json;
use tracing::{info, warn};
use wol_aggregator::{VMStarter, VmStartError};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const FIELD_MANAGER: &str = "wol-controller";

pub struct KubevirtStarter {
    client: Client,
}

impl KubevirtStarter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk("kubevirt.io", "v1", "VirtualMachine");
        let resource = kube::core::ApiResource::from_gvk(&gvk);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }

    async fn patch_run_strategy(
        &self,
        namespace: &str,
        name: &str,
        strategy: &str,
    ) -> Result<(), kube::Error> {
        let patch = json!({ "spec": { "runStrategy": strategy } });
        self.api(namespace)
            .patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn wait_until_running(&self, namespace: &str, name: &str) -> Result<(), VmStartError> {
        let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;
        loop {
            let vm = self.api(namespace).get(name).await.map_err(|e| to_start_error(namespace, name, e))?;
            let running = vm
                .data
                .pointer("/status/printableStatus")
                .and_then(|v| v.as_str())
                .map(|status| status.eq_ignore_ascii_case("running"))
                .unwrap_or(false);
            if running {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(VmStartError {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    reason: "timed out waiting for VM to reach Running".to_string(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait::async_trait]
impl VMStarter for KubevirtStarter {
    async fn start_vm(&self, namespace: &str, name: &str) -> Result<(), VmStartError> {
        let vm = self.api(namespace).get(name).await.map_err(|e| to_start_error(namespace, name, e))?;
        let original_strategy =
            vm.data.pointer("/spec/runStrategy").and_then(|v| v.as_str()).map(str::to_string);

        let needs_restore = needs_restore(original_strategy.as_deref());
        if needs_restore {
            info!(%namespace, %name, prior = ?original_strategy, "switching runStrategy to Always");
            self.patch_run_strategy(namespace, name, "Always")
                .await
                .map_err(|e| to_start_error(namespace, name, e))?;
        }

        self.wait_until_running(namespace, name).await?;

        if needs_restore {
            if let Some(strategy) = original_strategy {
                if let Err(e) = self.patch_run_strategy(namespace, name, &strategy).await {
                    warn!(%namespace, %name, error = %e, "failed to restore original runStrategy");
                }
            }
        }

        Ok(())
    }
}

fn to_start_error(namespace: &str, name: &str, err: kube::Error) -> VmStartError {
    VmStartError { namespace: namespace.to_string(), name: name.to_string(), reason: err.to_string() }
}

/// Whether the "always running" switch-and-restore dance applies, i.e.
/// the VM isn't already configured to run continuously.
fn needs_restore(current: Option<&str>) -> bool {
    current != Some("Always")
}

#[path = "kubevirt_tests.rs"]
#[cfg(test)]
mod kubevirt_tests;
