// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn empty_ports_default_to_nine() {
    let mut spec = WolConfigSpec::default();
    validate_config(&mut spec).unwrap();
    assert_eq!(spec.wol_ports, vec![9]);
}

#[test]
fn zero_cache_ttl_defaults_to_300() {
    let mut spec = WolConfigSpec::default();
    validate_config(&mut spec).unwrap();
    assert_eq!(spec.cache_ttl, 300);
}

#[test]
fn out_of_range_port_is_fatal() {
    let mut spec = WolConfigSpec { wol_ports: vec![0], ..Default::default() };
    assert_eq!(
        validate_config(&mut spec),
        Err(ValidationError::PortOutOfRange { index: 0, port: 0 })
    );
}

#[test]
fn too_many_ports_is_fatal() {
    let mut spec = WolConfigSpec { wol_ports: (1..=11).collect(), ..Default::default() };
    assert_eq!(validate_config(&mut spec), Err(ValidationError::TooManyPorts(11)));
}

#[test]
fn label_selector_mode_requires_vm_selector() {
    let mut spec =
        WolConfigSpec { discovery_mode: DiscoveryMode::LabelSelector, ..Default::default() };
    assert_eq!(validate_config(&mut spec), Err(ValidationError::MissingVmSelector));
}

#[test]
fn label_selector_mode_passes_with_selector() {
    let mut spec = WolConfigSpec {
        discovery_mode: DiscoveryMode::LabelSelector,
        vm_selector: Some("app=myvm".into()),
        ..Default::default()
    };
    assert!(validate_config(&mut spec).is_ok());
}

#[test]
fn explicit_mode_requires_at_least_one_mapping() {
    let mut spec = WolConfigSpec { discovery_mode: DiscoveryMode::Explicit, ..Default::default() };
    assert_eq!(validate_config(&mut spec), Err(ValidationError::EmptyExplicitMappings));
}

#[test]
fn explicit_mode_rejects_malformed_mac() {
    let mut spec = WolConfigSpec {
        discovery_mode: DiscoveryMode::Explicit,
        explicit_mappings: vec![ExplicitMapping {
            mac: "not-a-mac".into(),
            vm_name: "db-primary".into(),
            namespace: "production".into(),
        }],
        ..Default::default()
    };
    assert_eq!(
        validate_config(&mut spec),
        Err(ValidationError::InvalidExplicitMac { index: 0, mac: "not-a-mac".into() })
    );
}

#[test]
fn applying_defaults_twice_is_idempotent() {
    let mut spec = WolConfigSpec::default();
    validate_config(&mut spec).unwrap();
    let once = spec.clone();
    validate_config(&mut spec).unwrap();
    assert_eq!(spec, once);
}

#[test]
fn parse_cache_ttl_rejects_negative() {
    assert_eq!(parse_cache_ttl(-1), Err(ValidationError::NegativeCacheTtl));
    assert_eq!(parse_cache_ttl(0), Ok(0));
    assert_eq!(parse_cache_ttl(300), Ok(300));
}

#[test]
fn ready_condition_is_single_instance() {
    let mut status = WolConfigStatus::default();
    status.set_ready(true, "MappingUpdated", "ok");
    status.set_ready(false, "InvalidConfig", "bad");
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.ready_condition().unwrap().reason, "InvalidConfig");
}

#[test]
fn agent_spec_defaults_match_spec_document() {
    let agent = AgentSpec::default();
    assert_eq!(agent.requests_cpu(), "50m");
    assert_eq!(agent.requests_memory(), "64Mi");
    assert_eq!(agent.limits_cpu(), "100m");
    assert_eq!(agent.limits_memory(), "128Mi");
    assert_eq!(agent.max_unavailable(), "1");
}
