// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn restore_is_skipped_when_already_always_running() {
    assert!(!needs_restore(Some("Always")));
}

#[test]
fn restore_is_needed_for_manual_and_halted_and_unset_strategies() {
    assert!(needs_restore(Some("Manual")));
    assert!(needs_restore(Some("Halted")));
    assert!(needs_restore(None));
}
