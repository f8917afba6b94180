// SPDX-License-Identifier: MIT

//! Generic dedupe cache keyed by MAC address (spec §3 `DedupeEntry`).
//!
//! Both the Agent's local cache (2s TTL, no payload) and the Aggregator's
//! global cache (10s TTL, carries the previously returned response so
//! duplicates can be answered without a second lookup) are instances of
//! the same small structure: a `parking_lot::Mutex`-guarded map with a
//! short critical section, matching the single-mutex-per-map shape the
//! spec's concurrency model requires.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::mac::MacAddress;

/// One dedupe record. `payload` is `()` for the Agent's local cache and a
/// cached RPC response for the Aggregator's global cache.
#[derive(Debug, Clone)]
pub struct DedupeEntry<T> {
    pub last_seen: Instant,
    pub seen_count: u64,
    pub witnessed_nodes: Vec<String>,
    pub payload: T,
}

impl<T> DedupeEntry<T> {
    fn new(now: Instant, node: Option<&str>, payload: T) -> Self {
        DedupeEntry {
            last_seen: now,
            seen_count: 1,
            witnessed_nodes: node.into_iter().map(str::to_owned).collect(),
            payload,
        }
    }
}

/// A `mac -> DedupeEntry<T>` cache with a fixed TTL and periodic sweep.
pub struct DedupeCache<T: Clone, C: Clock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<MacAddress, DedupeEntry<T>>>,
}

/// Outcome of recording an observation against the cache.
pub enum Observation<T> {
    /// First sighting within the window; the caller should proceed (ship
    /// the event / look up the mapping / call VMStarter).
    Fresh,
    /// A live entry already existed; the caller should treat this as a
    /// duplicate and may inspect the cached payload.
    Duplicate(T),
}

impl<T: Clone, C: Clock> DedupeCache<T, C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        DedupeCache { ttl, clock, entries: Mutex::new(HashMap::new()) }
    }

    /// Check-and-record in one critical section so two concurrent callers
    /// for the same MAC can never both observe `Fresh`.
    pub fn observe(&self, mac: MacAddress, node: Option<&str>) -> Observation<T>
    where
        T: Default,
    {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(&mac) {
            if now.duration_since(entry.last_seen) < self.ttl {
                entry.seen_count += 1;
                if let Some(n) = node {
                    if !entry.witnessed_nodes.iter().any(|w| w == n) {
                        entry.witnessed_nodes.push(n.to_string());
                    }
                }
                return Observation::Duplicate(entry.payload.clone());
            }
        }
        entries.insert(mac, DedupeEntry::new(now, node, T::default()));
        Observation::Fresh
    }

    /// Record (or refresh) the entry with an explicit payload — used by the
    /// Aggregator after a lookup/start so subsequent duplicates can replay
    /// the previously returned response.
    pub fn record(&self, mac: MacAddress, node: Option<&str>, payload: T) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        entries.insert(mac, DedupeEntry::new(now, node, payload));
    }

    /// Evict entries older than `factor * ttl`. Called from the periodic
    /// sweep ticker (30s for both Agent and Aggregator per spec §3/§4.3).
    pub fn sweep(&self, factor: u32) {
        let now = self.clock.now();
        let horizon = self.ttl * factor;
        self.entries.lock().retain(|_, e| now.duration_since(e.last_seen) <= horizon);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[path = "dedupe_tests.rs"]
#[cfg(test)]
mod dedupe_tests;
