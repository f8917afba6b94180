// SPDX-License-Identifier: MIT

//! Startup drift detection (spec §4.4.5): one-shot, best-effort, never
//! blocks manager startup. Stamps an annotation on a `WolConfig` to
//! provoke a reconcile when its fleet's pod image has drifted from the
//! expected agent image and the config carries no explicit override.

use kube::api::{Api, Patch, PatchParams};
use kube::{Client, ResourceExt};
use serde_json::json;
use tracing::{info, warn};

use crate::crd::WolConfig;
use crate::fleet::{fleet_name, FIELD_MANAGER};
use crate::store::ControlPlane;

pub const DRIFT_ANNOTATION: &str = "wol.dev/drift-detected-at";

/// Scan every `WolConfig` against its fleet's actual container image.
/// `expected_image` is the operator's configured default agent image;
/// `None` skips the scan entirely (spec: "Skip gracefully if the expected
/// image is unset").
pub async fn detect_and_annotate<C: ControlPlane>(
    client: &Client,
    store: &C,
    expected_image: Option<&str>,
) {
    let Some(expected_image) = expected_image else {
        info!("no expected agent image configured, skipping startup drift scan");
        return;
    };

    let configs: Api<WolConfig> = Api::all(client.clone());
    let list = match configs.list(&Default::default()).await {
        Ok(list) => list,
        Err(err) => {
            warn!(error = %err, "drift scan: failed to list WolConfigs, skipping");
            return;
        }
    };

    for config in list {
        let name = config.name_any();
        let has_override = config.spec.agent.image.is_some();

        let actual_image = match store.fleet_image(&fleet_name(&name)).await {
            Ok(image) => image,
            Err(err) => {
                warn!(config = %name, error = %err, "drift scan: fleet lookup failed, skipping");
                continue;
            }
        };

        if is_drifted(has_override, actual_image.as_deref(), expected_image) {
            info!(config = %name, actual = ?actual_image, %expected_image, "drift detected, stamping annotation");
            if let Err(err) = stamp_annotation(&configs, &name).await {
                warn!(config = %name, error = %err, "failed to stamp drift annotation");
            }
        }
    }
}

/// Whether a config's fleet should be annotated to provoke a reconcile.
/// Pulled out of the scan loop so the decision is testable without a
/// cluster: an explicit image override always exempts the config, and a
/// fleet that hasn't been observed yet (`actual = None`) is never drifted.
fn is_drifted(has_image_override: bool, actual: Option<&str>, expected: &str) -> bool {
    if has_image_override {
        return false;
    }
    match actual {
        Some(actual) => actual != expected,
        None => false,
    }
}

async fn stamp_annotation(configs: &Api<WolConfig>, name: &str) -> Result<(), kube::Error> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let patch = json!({
        "metadata": {
            "annotations": { DRIFT_ANNOTATION: timestamp.to_string() }
        }
    });
    configs.patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch)).await?;
    Ok(())
}

#[path = "drift_tests.rs"]
#[cfg(test)]
mod drift_tests;
