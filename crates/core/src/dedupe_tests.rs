// SPDX-License-Identifier: MIT

use super::*;
use crate::clock::FakeClock;
use crate::mac::MacAddress;

fn mac() -> MacAddress {
    MacAddress::parse_lenient("52:54:00:12:34:56").unwrap()
}

#[test]
fn first_observation_is_fresh() {
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(2), FakeClock::new());
    assert!(matches!(cache.observe(mac(), Some("node-a")), Observation::Fresh));
}

#[test]
fn second_observation_within_ttl_is_duplicate() {
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(2), FakeClock::new());
    cache.observe(mac(), Some("node-a"));
    assert!(matches!(cache.observe(mac(), Some("node-b")), Observation::Duplicate(())));
}

#[test]
fn observation_after_ttl_is_fresh_again() {
    let clock = FakeClock::new();
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(2), clock.clone());
    cache.observe(mac(), None);
    clock.advance(Duration::from_secs(3));
    assert!(matches!(cache.observe(mac(), None), Observation::Fresh));
}

#[test]
fn record_replays_payload_on_duplicate() {
    let cache: DedupeCache<&'static str, FakeClock> =
        DedupeCache::new(Duration::from_secs(10), FakeClock::new());
    cache.record(mac(), Some("node-a"), "default/test-vm");
    match cache.observe(mac(), Some("node-b")) {
        Observation::Duplicate(payload) => assert_eq!(payload, "default/test-vm"),
        Observation::Fresh => panic!("expected duplicate"),
    }
}

#[test]
fn witnessed_nodes_accumulate_without_duplicates() {
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(10), FakeClock::new());
    cache.observe(mac(), Some("node-a"));
    cache.observe(mac(), Some("node-b"));
    cache.observe(mac(), Some("node-a"));
    let entries = cache.entries.lock();
    let entry = entries.get(&mac()).unwrap();
    assert_eq!(entry.witnessed_nodes, vec!["node-a".to_string(), "node-b".to_string()]);
    assert_eq!(entry.seen_count, 3);
}

#[test]
fn sweep_evicts_entries_older_than_factor_times_ttl() {
    let clock = FakeClock::new();
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(2), clock.clone());
    cache.observe(mac(), None);
    clock.advance(Duration::from_secs(5));
    cache.sweep(2);
    assert!(cache.is_empty());
}

#[test]
fn sweep_keeps_entries_within_horizon() {
    let clock = FakeClock::new();
    let cache: DedupeCache<(), FakeClock> = DedupeCache::new(Duration::from_secs(2), clock.clone());
    cache.observe(mac(), None);
    clock.advance(Duration::from_secs(3));
    cache.sweep(2);
    assert_eq!(cache.len(), 1);
}
