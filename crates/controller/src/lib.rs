// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wol-controller: the single process hosting both facets of the
//! Aggregator/Controller (spec §1 "singleton per cluster"). It reconciles
//! `WolConfig` objects into a merged mapping and a per-config agent fleet
//! (spec §4.4), and hosts the `wol-aggregator` gRPC service in-process so
//! the two share one `wol_core::mapping::MappingTable` by ownership
//! rather than over the wire (Design Note "mapping ownership cycle").

pub mod cli;
pub mod crd;
pub mod discovery;
pub mod drift;
pub mod error;
pub mod fleet;
pub mod health;
pub mod kubevirt;
pub mod reconcile;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::runtime::{finalizer, reflector, watcher, Controller, WatchStreamExt};
use kube::{Api, ResourceExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wol_aggregator::{AggregatorService, VMStarter};
use wol_core::clock::SystemClock;
use wol_core::mapping::MappingTable;
use wol_core::metrics::Metrics;
use wol_proto::AggregatorServer;

use cli::ControllerArgs;
use crd::WolConfig;
use error::ControllerError;
use kubevirt::KubevirtStarter;
use store::KubeStore;

const SWEEP_PERIOD: Duration = Duration::from_secs(10);
const SHUTDOWN_BUDGET: Duration = Duration::from_secs(5);
/// spec.md RPC surface: "Message size limit 1 MiB each direction".
const MAX_RPC_MESSAGE_BYTES: usize = 1024 * 1024;

struct RunContext {
    recon: Arc<reconcile::Context<KubeStore, SystemClock>>,
    configs: reflector::Store<WolConfig>,
    configs_api: Api<WolConfig>,
}

/// Wraps each reconcile in the mapping-cleanup finalizer (spec §8 S6) so a
/// deleted `WolConfig` still gets one last mapping rebuild, excluding
/// itself, before Kubernetes is allowed to actually remove it — a plain
/// watch loop never reconciles an object again once it's gone.
async fn reconcile_adapter(
    config: Arc<WolConfig>,
    ctx: Arc<RunContext>,
) -> Result<kube::runtime::controller::Action, reconcile::ReconcileError> {
    let all: Vec<WolConfig> = ctx.configs.state().iter().map(|arc| (**arc).clone()).collect();
    let recon = ctx.recon.clone();

    finalizer(&ctx.configs_api, reconcile::MAPPING_CLEANUP_FINALIZER, config, move |event| async move {
        match event {
            finalizer::Event::Apply(config) => {
                Ok::<_, std::convert::Infallible>(reconcile::reconcile_one(&config, &all, &recon).await)
            }
            finalizer::Event::Cleanup(config) => {
                let deleted = config.name_any();
                let remaining: Vec<WolConfig> =
                    all.into_iter().filter(|c| c.name_any() != deleted).collect();
                Ok(reconcile::reconcile_cleanup(&remaining, &recon).await)
            }
        }
    })
    .await
    .map_err(reconcile::ReconcileError::Finalizer)
}

fn error_policy_adapter(
    config: Arc<WolConfig>,
    err: &reconcile::ReconcileError,
    ctx: Arc<RunContext>,
) -> kube::runtime::controller::Action {
    reconcile::error_policy(config, err, ctx.recon.clone())
}

/// Run the controller until `shutdown` is cancelled. Startup order: build
/// the kube client → embedded Aggregator gRPC server → health/metrics
/// server → best-effort startup drift scan → reconcile loop → block.
pub async fn run(args: ControllerArgs, shutdown: CancellationToken) -> Result<(), ControllerError> {
    let client = kube::Client::try_default().await.map_err(ControllerError::KubeClient)?;
    let store = Arc::new(KubeStore::new(client.clone(), args.namespace.clone()));
    let mapping = MappingTable::new();
    let metrics = Metrics::new();

    let starter: Arc<dyn VMStarter> = Arc::new(KubevirtStarter::new(client.clone()));
    let aggregator = AggregatorService::new(mapping.clone(), starter, metrics.clone(), SystemClock);

    let grpc_addr = ([0, 0, 0, 0], args.grpc_port).into();
    let grpc_shutdown = shutdown.clone();
    let grpc_aggregator = aggregator.clone();
    let grpc_handle: JoinHandle<()> = tokio::spawn(async move {
        info!(port = args.grpc_port, "aggregator gRPC server listening");
        let service = AggregatorServer::new(grpc_aggregator)
            .max_decoding_message_size(MAX_RPC_MESSAGE_BYTES)
            .max_encoding_message_size(MAX_RPC_MESSAGE_BYTES);
        let result = tonic::transport::Server::builder()
            .add_service(service)
            .serve_with_shutdown(grpc_addr, async move { grpc_shutdown.cancelled().await })
            .await;
        if let Err(err) = result {
            warn!(error = %err, "aggregator gRPC server exited with error");
        }
    });

    let sweep_aggregator = aggregator.clone();
    let sweep_shutdown = shutdown.clone();
    let sweep_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_PERIOD);
        loop {
            tokio::select! {
                _ = ticker.tick() => sweep_aggregator.sweep(),
                _ = sweep_shutdown.cancelled() => break,
            }
        }
    });

    let health_listener = tokio::net::TcpListener::bind(("0.0.0.0", args.health_port))
        .await
        .map_err(ControllerError::HealthServer)?;
    info!(port = args.health_port, "health server listening");
    let health_shutdown = shutdown.clone();
    let health_router = health::router(metrics.clone());
    let health_handle = tokio::spawn(async move {
        let server = axum::serve(health_listener, health_router)
            .with_graceful_shutdown(async move { health_shutdown.cancelled().await });
        if let Err(err) = server.await {
            warn!(error = %err, "health server exited with error");
        }
    });

    {
        let client = client.clone();
        let store = store.clone();
        let expected_image = args.agent_image.clone();
        tokio::spawn(async move {
            drift::detect_and_annotate(&client, store.as_ref(), expected_image.as_deref()).await;
        });
    }

    let configs_api: Api<WolConfig> = Api::all(client.clone());
    let (reader, writer) = reflector::store();
    let watch_stream =
        reflector::reflector(writer, watcher::watcher(configs_api.clone(), watcher::Config::default()))
            .default_backoff()
            .touched_objects();

    let ctx = Arc::new(RunContext {
        recon: Arc::new(reconcile::Context {
            store: store.clone(),
            mapping: mapping.clone(),
            metrics: metrics.clone(),
            clock: SystemClock,
        }),
        configs: reader.clone(),
        configs_api,
    });

    let controller_shutdown = shutdown.clone();
    let controller_handle = tokio::spawn(async move {
        Controller::for_stream(watch_stream, reader)
            .graceful_shutdown_on(async move { controller_shutdown.cancelled().await })
            .run(reconcile_adapter, error_policy_adapter, ctx)
            .for_each(|result| async move {
                match result {
                    Ok(obj) => info!(?obj, "reconciled WolConfig"),
                    Err(err) => warn!(error = %err, "reconcile failed"),
                }
            })
            .await;
    });

    shutdown.cancelled().await;
    info!("shutdown signal received, draining controller loop");

    if tokio::time::timeout(SHUTDOWN_BUDGET, async {
        let _ = controller_handle.await;
        let _ = sweep_handle.await;
        let _ = grpc_handle.await;
        let _ = health_handle.await;
    })
    .await
    .is_err()
    {
        warn!("shutdown budget exceeded, exiting anyway");
    }

    Ok(())
}
