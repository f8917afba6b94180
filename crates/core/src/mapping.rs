// SPDX-License-Identifier: MIT

//! The runtime `MAC -> VM` mapping table owned by the Aggregator and
//! rebuilt wholesale by the Controller (spec §3/§4.4.3, Invariant 3).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::mac::MacAddress;

/// A single MAC → VM binding. Only ever constructed with an already
/// canonical [`MacAddress`], so Invariant 1 holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmBinding {
    pub mac: MacAddress,
    pub vm_name: String,
    pub namespace: String,
}

/// Reader-heavy `MAC -> VmBinding` table. Writers install a whole new
/// snapshot under a single lock so a lookup never observes a
/// half-constructed table; readers take a read lock for the lifetime of a
/// single `get`.
#[derive(Clone, Default)]
pub struct MappingTable {
    inner: Arc<RwLock<HashMap<MacAddress, VmBinding>>>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable::default()
    }

    /// Build a table from an arbitrary iterator of bindings, collapsing by
    /// MAC. When two sources bind the same MAC, the later one in iteration
    /// order wins — callers control precedence by ordering their OR-merge
    /// accordingly (spec §8 property 2).
    pub fn from_bindings(bindings: impl IntoIterator<Item = VmBinding>) -> Self {
        let mut map = HashMap::new();
        for binding in bindings {
            map.insert(binding.mac, binding);
        }
        MappingTable { inner: Arc::new(RwLock::new(map)) }
    }

    /// Atomically replace the whole table.
    pub fn install(&self, bindings: impl IntoIterator<Item = VmBinding>) {
        let mut map = HashMap::new();
        for binding in bindings {
            map.insert(binding.mac, binding);
        }
        *self.inner.write() = map;
    }

    pub fn get(&self, mac: &MacAddress) -> Option<VmBinding> {
        self.inner.read().get(mac).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[path = "mapping_tests.rs"]
#[cfg(test)]
mod mapping_tests;
