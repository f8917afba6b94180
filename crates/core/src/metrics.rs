// SPDX-License-Identifier: MIT

//! Shared Prometheus registry and the four named metrics from spec §6.
//! Both `wol-agent` and `wol-aggregator` construct one `Metrics` and mount
//! its `encode()` output behind `/metrics`; the Controller uses only the
//! gauge.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub wol_packets_total: IntCounter,
    pub wol_vm_started_total: IntCounter,
    pub wol_errors_total: IntCounter,
    pub wol_managed_vms: IntGauge,
}

impl Metrics {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let registry = Registry::new();
        let wol_packets_total =
            IntCounter::new("wol_packets_total", "WoL events received by the Aggregator").unwrap();
        let wol_vm_started_total =
            IntCounter::new("wol_vm_started_total", "Successful VMStart invocations").unwrap();
        let wol_errors_total =
            IntCounter::new("wol_errors_total", "VMStart or transport failures").unwrap();
        let wol_managed_vms = IntGauge::new("wol_managed_vms", "MappingTable size").unwrap();

        registry.register(Box::new(wol_packets_total.clone())).unwrap();
        registry.register(Box::new(wol_vm_started_total.clone())).unwrap();
        registry.register(Box::new(wol_errors_total.clone())).unwrap();
        registry.register(Box::new(wol_managed_vms.clone())).unwrap();

        Metrics { registry, wol_packets_total, wol_vm_started_total, wol_errors_total, wol_managed_vms }
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf).unwrap_or_default();
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[path = "metrics_tests.rs"]
#[cfg(test)]
mod metrics_tests;
