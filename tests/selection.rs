//! Tests for the approved-fix selection.
mod common;
use common::*;
use serde_json::json;
use shinsa::prelude::*;

#[test]
fn test_toggle_twice_restores_membership() {
    let mut selection: FixSelection = ["a"].into_iter().collect();
    let before = selection.clone();

    selection.toggle("b");
    assert!(selection.is_approved("b"));
    selection.toggle("b");
    assert_eq!(selection, before);

    selection.toggle("a");
    assert!(!selection.is_approved("a"));
    selection.toggle("a");
    assert_eq!(selection, before);
}

#[test]
fn test_toggle_accepts_unknown_ids() {
    let mut selection = FixSelection::new();
    selection.toggle("not-in-any-result");
    assert_eq!(selection.len(), 1);
}

#[test]
fn test_approve_all_selects_exactly_auto_fixable() {
    let analysis = create_sample_analysis();
    let mut selection = FixSelection::new();
    selection.approve_all(&analysis.errors);

    let mut ids: Vec<&str> = selection.iter().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["missing-url", "timezone"]);
}

#[test]
fn test_approve_all_overrides_manual_approval_of_input_fix() {
    let analysis = create_sample_analysis();
    let mut selection = FixSelection::new();
    selection.toggle("missing-token");
    selection.toggle("stale-id");
    assert!(selection.is_approved("missing-token"));

    selection.approve_all(&analysis.errors);
    assert!(!selection.is_approved("missing-token"));
    assert!(!selection.is_approved("stale-id"));
    assert_eq!(selection.len(), 2);
}

#[test]
fn test_approve_all_is_idempotent() {
    let analysis = create_sample_analysis();
    let mut once = FixSelection::new();
    once.approve_all(&analysis.errors);
    let mut twice = once.clone();
    twice.approve_all(&analysis.errors);
    assert_eq!(once, twice);
}

#[test]
fn test_reset_empties_selection() {
    let mut selection: FixSelection = ["a", "b"].into_iter().collect();
    selection.reset();
    assert!(selection.is_empty());
}

#[test]
fn test_retain_known_drops_foreign_ids() {
    let issues = vec![create_issue("keep", "a", json!(1), false)];
    let mut selection: FixSelection = ["keep", "drop"].into_iter().collect();
    selection.retain_known(&issues);
    assert!(selection.is_approved("keep"));
    assert!(!selection.is_approved("drop"));
}
