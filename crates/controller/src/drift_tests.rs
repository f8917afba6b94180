// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn explicit_override_is_never_flagged() {
    assert!(!is_drifted(true, Some("old:tag"), "new:tag"));
}

#[test]
fn unobserved_fleet_is_never_flagged() {
    assert!(!is_drifted(false, None, "new:tag"));
}

#[test]
fn mismatched_image_without_override_is_flagged() {
    assert!(is_drifted(false, Some("old:tag"), "new:tag"));
}

#[test]
fn matching_image_is_not_flagged() {
    assert!(!is_drifted(false, Some("new:tag"), "new:tag"));
}
