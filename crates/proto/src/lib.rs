// SPDX-License-Identifier: MIT

//! Generated `tonic`/`prost` types for the Agent↔Aggregator RPC surface
//! (spec.md §4.3, §6), plus conversions to/from `wol-core` domain types so
//! neither the Agent nor the Aggregator has to touch `wol.v1::*` directly
//! outside the transport boundary.

pub mod wol {
    pub mod v1 {
        tonic::include_proto!("wol.v1");
    }
}

pub use wol::v1::{
    aggregator_client::AggregatorClient,
    aggregator_server::{Aggregator, AggregatorServer},
    HealthCheckRequest, HealthCheckResponse, ServingStatus, VmInfo, WolEvent, WolEventResponse,
    WolStatus,
};

use wol_core::mapping::VmBinding;

/// A captured/shipped WoL observation in domain form, independent of the
/// wire encoding. The Agent builds one of these per fresh local
/// observation; the Aggregator converts it to/from [`WolEvent`] at the
/// transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WolObservation {
    pub mac: wol_core::mac::MacAddress,
    pub timestamp_ms: i64,
    pub node_name: String,
    pub source_ip: String,
    pub source_port: u32,
    pub packet_size: u32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("malformed MAC address on the wire: {0}")]
    BadMac(String),
}

impl TryFrom<WolEvent> for WolObservation {
    type Error = ConversionError;

    fn try_from(event: WolEvent) -> Result<Self, Self::Error> {
        let mac = wol_core::mac::MacAddress::parse_lenient(&event.mac_address)
            .map_err(|_| ConversionError::BadMac(event.mac_address.clone()))?;
        Ok(WolObservation {
            mac,
            timestamp_ms: event.timestamp_ms,
            node_name: event.node_name,
            source_ip: event.source_ip,
            source_port: event.source_port,
            packet_size: event.packet_size,
        })
    }
}

impl From<WolObservation> for WolEvent {
    fn from(obs: WolObservation) -> Self {
        WolEvent {
            mac_address: obs.mac.canonical(),
            timestamp_ms: obs.timestamp_ms,
            node_name: obs.node_name,
            source_ip: obs.source_ip,
            source_port: obs.source_port,
            packet_size: obs.packet_size,
        }
    }
}

impl From<&VmBinding> for VmInfo {
    fn from(binding: &VmBinding) -> Self {
        VmInfo {
            name: binding.vm_name.clone(),
            namespace: binding.namespace.clone(),
            current_state: String::new(),
        }
    }
}

/// Build a [`WolEventResponse`] for a given status, carrying VM identity
/// when one applies (spec.md §6: `vmInfo` is present for
/// `VM_START_INITIATED`/`DUPLICATE`/`ERROR`-with-identity).
pub fn response(
    status: WolStatus,
    message: impl Into<String>,
    vm_info: Option<VmInfo>,
    processing_time_ms: u64,
    was_duplicate: bool,
) -> WolEventResponse {
    WolEventResponse {
        status: status as i32,
        message: message.into(),
        vm_info,
        processing_time_ms,
        was_duplicate,
    }
}

#[path = "lib_tests.rs"]
#[cfg(test)]
mod lib_tests;
