// SPDX-License-Identifier: MIT

//! Shared agent state read by the health surface and mutated by the
//! capture/shipping loops (spec.md §4.2.4).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use wol_core::clock::SystemClock;
use wol_core::dedupe::DedupeCache;
use wol_core::metrics::Metrics;

pub struct AgentState {
    /// Set once the aggregator client exists (the channel may still be
    /// reconnecting under the hood; tonic channels are lazy).
    rpc_ready: AtomicBool,
    /// Number of UDP ports currently bound.
    udp_bound_count: AtomicUsize,
    pub dedupe: DedupeCache<(), SystemClock>,
    pub metrics: Metrics,
}

impl AgentState {
    pub fn new(local_dedupe_ttl: std::time::Duration) -> Self {
        Self {
            rpc_ready: AtomicBool::new(false),
            udp_bound_count: AtomicUsize::new(0),
            dedupe: DedupeCache::new(local_dedupe_ttl, SystemClock),
            metrics: Metrics::new(),
        }
    }

    pub fn set_rpc_ready(&self, ready: bool) {
        self.rpc_ready.store(ready, Ordering::SeqCst);
    }

    pub fn mark_udp_bound(&self) {
        self.udp_bound_count.fetch_add(1, Ordering::SeqCst);
    }

    /// `GET /healthz`: the RPC channel object exists.
    pub fn is_healthy(&self) -> bool {
        self.rpc_ready.load(Ordering::SeqCst)
    }

    /// `GET /readyz`: at least one UDP socket is bound AND the RPC channel exists.
    pub fn is_ready(&self) -> bool {
        self.is_healthy() && self.udp_bound_count.load(Ordering::SeqCst) > 0
    }
}

#[path = "state_tests.rs"]
#[cfg(test)]
mod state_tests;
