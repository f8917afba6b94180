// SPDX-License-Identifier: MIT

//! Builds the `wol-agent-<config-name>` fleet spec from a `WolConfigSpec`
//! (spec §4.4.2). A DaemonSet: spec §8's idempotence law ("reconciling the
//! same WolConfig twice yields identical AgentFleet specs") and S6's "one
//! pod per node" both fall straight out of DaemonSet semantics, so there
//! is no custom scheduling logic to get wrong.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec, DaemonSetUpdateStrategy, RollingUpdateDaemonSet};
use k8s_openapi::api::core::v1::{
    Capabilities, Container, ContainerPort, EnvVar, HTTPGetAction, PodSpec, PodTemplateSpec, Probe,
    ResourceRequirements, SecurityContext, Toleration,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

use wol_core::config::AgentSpec;

use crate::crd::WolConfig;

pub const FIELD_MANAGER: &str = "wol-controller";

/// The `operator-address` DNS name every agent is pointed at: the
/// in-cluster service fronting the Aggregator facet of this same binary.
pub const AGGREGATOR_SERVICE_ADDRESS: &str = "http://wol-aggregator:7070";

const DEFAULT_IMAGE: &str = "ghcr.io/wol-project/wol-agent:latest";
const HEALTH_PORT: i32 = 8080;

pub fn fleet_name(config_name: &str) -> String {
    format!("wol-agent-{config_name}")
}

/// Build the DaemonSet for a reconciled `WolConfig`. Deterministic in
/// every field that is derived from `spec`/`owner`, so repeated calls with
/// unchanged inputs produce identical specs (spec §8 idempotence law).
pub fn build_fleet(config: &WolConfig, spec: &wol_core::config::WolConfigSpec) -> DaemonSet {
    let name = fleet_name(&config.name_any());
    let namespace = "wol-system".to_string();
    let labels: BTreeMap<String, String> = [
        ("app".to_string(), "wol-agent".to_string()),
        ("wol.dev/config".to_string(), config.name_any()),
    ]
    .into_iter()
    .collect();

    let owner = OwnerReference {
        api_version: "wol.dev/v1".to_string(),
        kind: "WolConfig".to_string(),
        name: config.name_any(),
        uid: config.uid().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    };

    DaemonSet {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: Some(labels.clone()),
            owner_references: Some(vec![owner]),
            ..Default::default()
        },
        spec: Some(DaemonSetSpec {
            selector: LabelSelector { match_labels: Some(labels.clone()), ..Default::default() },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                spec: Some(build_pod_spec(&spec.agent, &spec.wol_ports)),
            },
            update_strategy: Some(DaemonSetUpdateStrategy {
                type_: Some("RollingUpdate".to_string()),
                rolling_update: Some(RollingUpdateDaemonSet {
                    max_unavailable: Some(IntOrString::String(
                        spec.agent.max_unavailable().to_string(),
                    )),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_pod_spec(agent: &AgentSpec, wol_ports: &[u16]) -> PodSpec {
    let ports_csv = wol_ports.iter().map(u16::to_string).collect::<Vec<_>>().join(",");

    let args = vec![
        "--node-name=$(NODE_NAME)".to_string(),
        format!("--operator-address={AGGREGATOR_SERVICE_ADDRESS}"),
        format!("--ports={ports_csv}"),
    ];

    let container = Container {
        name: "wol-agent".to_string(),
        image: Some(agent.image.clone().unwrap_or_else(|| DEFAULT_IMAGE.to_string())),
        image_pull_policy: agent.image_pull_policy.clone(),
        args: Some(args),
        env: Some(vec![EnvVar {
            name: "NODE_NAME".to_string(),
            value_from: Some(k8s_openapi::api::core::v1::EnvVarSource {
                field_ref: Some(k8s_openapi::api::core::v1::ObjectFieldSelector {
                    field_path: "spec.nodeName".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ports: Some(vec![ContainerPort { container_port: HEALTH_PORT, ..Default::default() }]),
        security_context: Some(SecurityContext {
            run_as_user: Some(0),
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                add: Some(vec!["NET_BIND_SERVICE".to_string()]),
                drop: Some(vec!["ALL".to_string()]),
            }),
            ..Default::default()
        }),
        liveness_probe: Some(health_probe("/healthz")),
        readiness_probe: Some(health_probe("/readyz")),
        resources: Some(ResourceRequirements {
            requests: Some(
                [
                    ("cpu".to_string(), Quantity(agent.requests_cpu().to_string())),
                    ("memory".to_string(), Quantity(agent.requests_memory().to_string())),
                ]
                .into_iter()
                .collect(),
            ),
            limits: Some(
                [
                    ("cpu".to_string(), Quantity(agent.limits_cpu().to_string())),
                    ("memory".to_string(), Quantity(agent.limits_memory().to_string())),
                ]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        }),
        ..Default::default()
    };

    PodSpec {
        containers: vec![container],
        host_network: Some(true),
        dns_policy: Some("ClusterFirstWithHostNet".to_string()),
        node_selector: agent.node_selector.clone(),
        priority_class_name: agent.priority_class_name.clone(),
        tolerations: Some(default_tolerations()),
        ..Default::default()
    }
}

fn health_probe(path: &str) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_string()),
            port: IntOrString::Int(HEALTH_PORT),
            ..Default::default()
        }),
        period_seconds: Some(10),
        ..Default::default()
    }
}

/// Tolerate every `NoSchedule`/`NoExecute` taint (spec §4.4.2 default).
fn default_tolerations() -> Vec<Toleration> {
    vec![
        Toleration { effect: Some("NoSchedule".to_string()), operator: Some("Exists".to_string()), ..Default::default() },
        Toleration { effect: Some("NoExecute".to_string()), operator: Some("Exists".to_string()), ..Default::default() },
    ]
}

#[path = "fleet_tests.rs"]
#[cfg(test)]
mod fleet_tests;
