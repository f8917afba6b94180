// SPDX-License-Identifier: MIT

//! The `Aggregator` RPC service implementation (spec.md §4.3): global
//! dedupe, MappingTable lookup, VM start dispatch.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, warn};

use wol_core::clock::Clock;
use wol_core::dedupe::{DedupeCache, Observation};
use wol_core::mac::MacAddress;
use wol_core::mapping::MappingTable;
use wol_core::metrics::Metrics;
use wol_proto::{
    response, Aggregator, HealthCheckRequest, HealthCheckResponse, ServingStatus, VmInfo,
    WolEvent, WolEventResponse, WolStatus,
};

use crate::vmstarter::VMStarter;

pub const GLOBAL_DEDUPE_TTL: Duration = Duration::from_secs(10);
pub const SWEEP_FACTOR: u32 = 2;

struct Inner<C: Clock> {
    mapping: MappingTable,
    dedupe: DedupeCache<WolEventResponse, C>,
    starter: Arc<dyn VMStarter>,
    metrics: Metrics,
    clock: C,
}

/// Shared, cheaply cloneable: the dedupe cache and mapping table are the
/// one instance every unary call, every stream item, and the background
/// sweep ticker operate against — global dedupe only holds if they all
/// see the same map.
#[derive(Clone)]
pub struct AggregatorService<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> AggregatorService<C> {
    pub fn new(mapping: MappingTable, starter: Arc<dyn VMStarter>, metrics: Metrics, clock: C) -> Self {
        let dedupe = DedupeCache::new(GLOBAL_DEDUPE_TTL, clock.clone());
        Self { inner: Arc::new(Inner { mapping, dedupe, starter, metrics, clock }) }
    }

    pub fn sweep(&self) {
        self.inner.dedupe.sweep(SWEEP_FACTOR);
    }

    async fn handle_event(&self, event: WolEvent) -> WolEventResponse {
        let started = self.inner.clock.now();
        self.inner.metrics.wol_packets_total.inc();

        let mac = match MacAddress::parse_lenient(&event.mac_address) {
            Ok(mac) => mac,
            Err(_) => {
                return response(
                    WolStatus::Error,
                    format!("malformed MAC address: {}", event.mac_address),
                    None,
                    elapsed_ms(self.inner.clock.now(), started),
                    false,
                );
            }
        };

        match self.inner.dedupe.observe(mac, Some(&event.node_name)) {
            Observation::Duplicate(cached) => {
                let mut resp = cached;
                resp.status = WolStatus::Duplicate as i32;
                resp.was_duplicate = true;
                resp.processing_time_ms = elapsed_ms(self.inner.clock.now(), started);
                resp
            }
            Observation::Fresh => {
                let resp = self.dispatch_fresh(mac, started).await;
                self.inner.dedupe.record(mac, Some(&event.node_name), resp.clone());
                resp
            }
        }
    }

    async fn dispatch_fresh(&self, mac: MacAddress, started: std::time::Instant) -> WolEventResponse {
        let Some(binding) = self.inner.mapping.get(&mac) else {
            return response(
                WolStatus::VmNotFound,
                format!("no VM mapped to {mac}"),
                None,
                elapsed_ms(self.inner.clock.now(), started),
                false,
            );
        };

        let vm_info = VmInfo::from(&binding);
        match self.inner.starter.start_vm(&binding.namespace, &binding.vm_name).await {
            Ok(()) => {
                self.inner.metrics.wol_vm_started_total.inc();
                response(
                    WolStatus::VmStartInitiated,
                    format!("starting {}/{}", binding.namespace, binding.vm_name),
                    Some(vm_info),
                    elapsed_ms(self.inner.clock.now(), started),
                    false,
                )
            }
            Err(err) => {
                self.inner.metrics.wol_errors_total.inc();
                warn!(mac = %mac, error = %err, "VMStarter failed");
                response(
                    WolStatus::Error,
                    err.to_string(),
                    Some(vm_info),
                    elapsed_ms(self.inner.clock.now(), started),
                    false,
                )
            }
        }
    }
}

fn elapsed_ms(now: std::time::Instant, started: std::time::Instant) -> u64 {
    now.saturating_duration_since(started).as_millis() as u64
}

type ResponseStream = Pin<Box<dyn Stream<Item = Result<WolEventResponse, Status>> + Send + 'static>>;

#[async_trait::async_trait]
impl<C: Clock + 'static> Aggregator for AggregatorService<C> {
    async fn report_wol_event(
        &self,
        request: Request<WolEvent>,
    ) -> Result<Response<WolEventResponse>, Status> {
        Ok(Response::new(self.handle_event(request.into_inner()).await))
    }

    type ReportWOLEventStreamStream = ResponseStream;

    async fn report_wol_event_stream(
        &self,
        request: Request<Streaming<WolEvent>>,
    ) -> Result<Response<Self::ReportWOLEventStreamStream>, Status> {
        let mut incoming = request.into_inner();
        let service = self.clone();

        let output = async_stream::try_stream! {
            while let Some(event) = incoming.message().await? {
                yield service.handle_event(event).await;
            }
        };

        Ok(Response::new(Box::pin(output)))
    }

    async fn health_check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        info!(managed_vms = self.inner.mapping.len(), "health check");
        Ok(Response::new(HealthCheckResponse { status: ServingStatus::Serving as i32 }))
    }
}

#[path = "service_tests.rs"]
#[cfg(test)]
mod service_tests;
