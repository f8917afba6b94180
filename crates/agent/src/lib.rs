// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wol-agent: the per-node capture agent (spec.md §4.2). Binds a UDP
//! listener per configured port, opens best-effort raw L2 capture, dedupes
//! locally, and ships fresh observations to the aggregator over RPC.

pub mod capture;
pub mod cli;
pub mod error;
pub mod health;
pub mod shipping;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wol_capture::{bind_udp_socket, L2Capability, NullL2Capture, PnetL2Capture};
use wol_core::clock::SystemClock;
use wol_core::mac::MacAddress;
use wol_proto::{AggregatorClient, HealthCheckRequest};

use capture::Sighting;
use cli::AgentArgs;
use error::AgentError;
use shipping::Observation;
use state::AgentState;

const LOCAL_DEDUPE_TTL: Duration = Duration::from_secs(2);
const SWEEP_PERIOD: Duration = Duration::from_secs(30);
const SWEEP_FACTOR: u32 = 3;
const SHUTDOWN_BUDGET: Duration = Duration::from_secs(2);
/// spec.md RPC surface: "Message size limit 1 MiB each direction".
const MAX_RPC_MESSAGE_BYTES: usize = 1024 * 1024;

/// Run the agent until `shutdown` is cancelled. Startup order follows
/// spec.md §4.2.5: connect RPC (non-fatal health check) → bind UDP → start
/// raw listeners (best-effort) → start health server → block.
pub async fn run(args: AgentArgs, shutdown: CancellationToken) -> Result<(), AgentError> {
    let channel = tonic::transport::Endpoint::from_shared(args.aggregator_address.clone())
        .map_err(|source| AgentError::AggregatorConnect {
            address: args.aggregator_address.clone(),
            source,
        })?
        .connect_lazy();
    let mut client = AggregatorClient::new(channel)
        .max_decoding_message_size(MAX_RPC_MESSAGE_BYTES)
        .max_encoding_message_size(MAX_RPC_MESSAGE_BYTES);

    let state = Arc::new(AgentState::new(LOCAL_DEDUPE_TTL));
    state.set_rpc_ready(true);

    match tokio::time::timeout(
        Duration::from_secs(5),
        client.health_check(HealthCheckRequest { service: "wol.v1.Aggregator".to_string() }),
    )
    .await
    {
        Ok(Ok(_)) => info!("aggregator health check succeeded"),
        Ok(Err(err)) => warn!(error = %err, "aggregator health check failed, continuing anyway"),
        Err(_) => warn!("aggregator health check timed out, continuing anyway"),
    }

    let mut handles: Vec<JoinHandle<()>> = Vec::new();
    let (sighting_tx, sighting_rx) = mpsc::unbounded_channel();

    for &port in &args.ports {
        match bind_udp_socket(port) {
            Ok(socket) => {
                state.mark_udp_bound();
                let socket = Arc::new(socket);
                let sink = sighting_tx.clone();
                let token = shutdown.clone();
                handles.push(tokio::spawn(capture::udp_read_loop(socket, port, sink, token)));
                info!(port, "UDP capture bound");
            }
            Err(err) => {
                warn!(port, error = %err, "failed to bind UDP capture port, continuing with remaining ports");
            }
        }
    }

    // Raw capture yields bare `MacAddress`es (no UDP source info), so it
    // gets its own channel and a small forwarding task that wraps each one
    // into a `Sighting` before it joins the shared dedupe-and-forward path.
    let (mac_tx, mut mac_rx) = mpsc::unbounded_channel::<MacAddress>();

    if !args.disable_raw_capture {
        let sink = mac_tx.clone();
        let token = shutdown.clone();
        handles.push(tokio::spawn(async move {
            let capture = PnetL2Capture;
            if let Err(err) = capture.run(sink, token).await {
                capture::warn_raw_capture_unavailable(err);
            }
        }));
    } else {
        let sink = mac_tx.clone();
        let token = shutdown.clone();
        handles.push(tokio::spawn(async move {
            let _ = NullL2Capture.run(sink, token).await;
        }));
    }
    drop(mac_tx);

    {
        let sink = sighting_tx.clone();
        handles.push(tokio::spawn(async move {
            while let Some(mac) = mac_rx.recv().await {
                let sighting = Sighting { mac, observation: Observation::default() };
                if sink.send(sighting).is_err() {
                    return;
                }
            }
        }));
    }
    drop(sighting_tx);

    {
        let state = state.clone();
        let node_name = args.node_name.clone();
        let client = client.clone();
        let clock = SystemClock;
        handles.push(tokio::spawn(async move {
            capture::dedupe_and_forward(sighting_rx, state.clone(), move |mac, observation| {
                let state = state.clone();
                let node_name = node_name.clone();
                let mut client = client.clone();
                let clock = clock.clone();
                async move {
                    shipping::ship(&mut client, &state, &node_name, &clock, mac, observation).await;
                }
            })
            .await;
        }));
    }

    handles.push(tokio::spawn(capture::sweep_loop(
        state.clone(),
        SWEEP_PERIOD,
        SWEEP_FACTOR,
        shutdown.clone(),
    )));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.health_port))
        .await
        .map_err(AgentError::HealthServer)?;
    info!(port = args.health_port, "health server listening");
    let health_router = health::router(state.clone());
    let health_shutdown = shutdown.clone();
    let health_handle = tokio::spawn(async move {
        let server = axum::serve(listener, health_router)
            .with_graceful_shutdown(async move { health_shutdown.cancelled().await });
        if let Err(err) = server.await {
            warn!(error = %err, "health server exited with error");
        }
    });

    shutdown.cancelled().await;
    info!("shutdown signal received, draining capture loops");

    if tokio::time::timeout(SHUTDOWN_BUDGET, async {
        for handle in handles {
            let _ = handle.await;
        }
        let _ = health_handle.await;
    })
    .await
    .is_err()
    {
        warn!("shutdown budget exceeded, exiting anyway");
    }

    Ok(())
}
