// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wol-aggregator: the global-dedupe, MappingTable-lookup, VM-start-dispatch
//! RPC service (spec.md §4.3). A library, not a binary — `wol-controller`
//! constructs and serves it in the same process as the reconciler so the
//! MappingTable can be shared by ownership rather than over the wire.

pub mod service;
pub mod vmstarter;

pub use service::{AggregatorService, GLOBAL_DEDUPE_TTL, SWEEP_FACTOR};
pub use vmstarter::{VMStarter, VmStartError};
