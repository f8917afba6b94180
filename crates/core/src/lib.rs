// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wol-core: shared data model and pure logic for the Wake-on-LAN wake
//! pipeline — the packet decoder, the declarative `WolConfig` object, the
//! runtime mapping table, and the dedupe cache used independently by the
//! Node Agent and the Aggregator.

pub mod clock;
pub mod config;
pub mod dedupe;
pub mod decoder;
pub mod mac;
pub mod mapping;
pub mod metrics;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    AgentSpec, DiscoveryMode, ExplicitMapping, WolCondition, WolConfigSpec, WolConfigStatus,
    ValidationError,
};
pub use dedupe::{DedupeCache, DedupeEntry};
pub use decoder::{decode_magic_payload, is_broadcast_mac, MAGIC_PAYLOAD_LEN};
pub use mac::MacAddress;
pub use mapping::{MappingTable, VmBinding};
pub use metrics::Metrics;
