// SPDX-License-Identifier: MIT

//! The reconcile loop body (spec §4.4.1, §4.4.3, §4.4.4, §4.4.6, §4.4.7).
//! Kept generic over [`ControlPlane`] so it runs against [`crate::test_support::FakeStore`]
//! in tests and a real `kube::Client`-backed [`crate::store::KubeStore`] in production.

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::ResourceExt;
use thiserror::Error;
use tracing::{error, warn};

use wol_core::clock::Clock;
use wol_core::config::{validate_config, AgentStatus};
use wol_core::mapping::{MappingTable, VmBinding};
use wol_core::metrics::Metrics;

use crate::crd::WolConfig;
use crate::discovery::bindings_for_config;
use crate::fleet::{build_fleet, fleet_name};
use crate::store::ControlPlane;

const TRANSIENT_REQUEUE: Duration = Duration::from_secs(30);
const DEFAULT_SUCCESS_REQUEUE_SECS: u64 = 300;

pub const MAPPING_CLEANUP_FINALIZER: &str = "wol.dev/mapping-cleanup";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("finalizer bookkeeping failed: {0}")]
    Finalizer(#[from] kube::runtime::finalizer::Error<std::convert::Infallible>),
}

pub struct Context<C: ControlPlane, Cl: Clock> {
    pub store: Arc<C>,
    pub mapping: MappingTable,
    pub metrics: Metrics,
    pub clock: Cl,
}

/// Reconcile a single `WolConfig`. `all_configs` is the full set currently
/// known to the controller's watch (including `config` itself); it feeds
/// the OR-merge that rebuilds the shared mapping on every reconcile (spec
/// §4.4.3).
pub async fn reconcile_one<C: ControlPlane, Cl: Clock>(
    config: &WolConfig,
    all_configs: &[WolConfig],
    ctx: &Context<C, Cl>,
) -> Action {
    let name = config.name_any();
    let mut spec: wol_core::config::WolConfigSpec = (&config.spec).into();

    if let Err(err) = validate_config(&mut spec) {
        warn!(config = %name, error = %err, "WolConfig validation failed");
        let mut status = config.status.clone().unwrap_or_default();
        status.set_ready(false, "InvalidConfig", err.to_string());
        let _ = ctx.store.patch_wolconfig_status(&name, &status).await;
        return Action::await_change();
    }

    let fleet = build_fleet(config, &spec);
    if let Err(err) = ctx.store.apply_agent_fleet(fleet).await {
        error!(config = %name, error = %err, "fleet reconcile failed");
        let mut status = config.status.clone().unwrap_or_default();
        status.set_ready(false, "AgentFailed", err.to_string());
        let _ = ctx.store.patch_wolconfig_status(&name, &status).await;
        return Action::requeue(TRANSIENT_REQUEUE);
    }

    let bindings = rebuild_mapping(all_configs, ctx.store.as_ref()).await;
    let managed_vms = bindings.len();
    ctx.mapping.install(bindings);
    ctx.metrics.wol_managed_vms.set(managed_vms as i64);

    let observed =
        ctx.store.fleet_observed(&fleet_name(&name)).await.ok().flatten().unwrap_or_default();

    let mut status = config.status.clone().unwrap_or_default();
    status.managed_vms = managed_vms as i64;
    status.last_sync = Some(ctx.clock.epoch_ms().to_string());
    status.agent_status = AgentStatus {
        scheduled: observed.scheduled,
        ready: observed.ready,
        available: observed.available,
        fleet_name: Some(fleet_name(&name)),
    };
    status.set_ready(true, "MappingUpdated", "mapping refreshed");

    if let Err(err) = ctx.store.patch_wolconfig_status(&name, &status).await {
        warn!(config = %name, error = %err, "status patch failed");
    }

    let requeue_secs = if spec.cache_ttl > 0 { spec.cache_ttl as u64 } else { DEFAULT_SUCCESS_REQUEUE_SECS };
    Action::requeue(Duration::from_secs(requeue_secs))
}

/// The last reconcile a deleted `WolConfig` gets, run by the
/// [`MAPPING_CLEANUP_FINALIZER`] just before Kubernetes is allowed to
/// actually remove it (spec §8 S6). `remaining_configs` is every other
/// `WolConfig` still known to the watch, i.e. `all_configs` with the one
/// being deleted already filtered out — rebuilding from that set (rather
/// than relying on some other config's own requeue) is what makes
/// `wol_managed_vms` converge to 0 when the deleted config was the last
/// one.
pub async fn reconcile_cleanup<C: ControlPlane, Cl: Clock>(
    remaining_configs: &[WolConfig],
    ctx: &Context<C, Cl>,
) -> Action {
    let bindings = rebuild_mapping(remaining_configs, ctx.store.as_ref()).await;
    ctx.metrics.wol_managed_vms.set(bindings.len() as i64);
    ctx.mapping.install(bindings);
    Action::await_change()
}

/// OR-merge every known `WolConfig`'s contribution into one binding set
/// (Design Note "Merged-config OR semantics", spec §8 property 2). Invalid
/// configs and per-config discovery failures are logged and skipped; they
/// never abort the rebuild (spec §4.4.7).
async fn rebuild_mapping<C: ControlPlane>(all_configs: &[WolConfig], store: &C) -> Vec<VmBinding> {
    let mut out = Vec::new();
    for config in all_configs {
        let mut spec: wol_core::config::WolConfigSpec = (&config.spec).into();
        if validate_config(&mut spec).is_err() {
            continue;
        }
        match bindings_for_config(store, &spec).await {
            Ok(bindings) => out.extend(bindings),
            Err(err) => {
                warn!(config = %config.name_any(), error = %err, "VM discovery failed; skipping this config");
            }
        }
    }
    out
}

pub fn error_policy<C: ControlPlane, Cl: Clock>(
    _config: Arc<WolConfig>,
    err: &ReconcileError,
    _ctx: Arc<Context<C, Cl>>,
) -> Action {
    error!(error = %err, "reconcile failed unexpectedly");
    Action::requeue(TRANSIENT_REQUEUE)
}

#[path = "reconcile_tests.rs"]
#[cfg(test)]
mod reconcile_tests;
