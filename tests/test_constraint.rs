//! Exercises `ConstraintEngine`'s violation detection and preferred-host selection.

mod support;

use fleet_drs::constraint::ConstraintEngine;
use fleet_drs::model::{HostId, VmId};
use support::Fixture;

#[test]
fn no_violations_when_group_is_already_spread() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 0.0, 0.0)
        .vm("vm1", "appvm01", "h1", 100.0, 100.0)
        .vm("vm2", "appvm02", "h2", 100.0, 100.0)
        .build();

    let engine = ConstraintEngine::new(&snapshot);
    assert!(engine.compute_violations().is_empty());
}

#[test]
fn concentrated_group_on_one_host_is_a_violation() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h4", "host-4", 10_000.0, 10_000.0, 0.0, 0.0)
        .vm("vm1", "appvm01", "h1", 100.0, 100.0)
        .vm("vm2", "appvm02", "h1", 100.0, 100.0)
        .vm("vm3", "appvm03", "h1", 100.0, 100.0)
        .vm("vm4", "appvm04", "h1", 100.0, 100.0)
        .vm("vm5", "appvm05", "h1", 100.0, 100.0)
        .vm("vm6", "appvm06", "h1", 100.0, 100.0)
        .build();

    let engine = ConstraintEngine::new(&snapshot);
    let violations = engine.compute_violations();
    assert!(!violations.is_empty());
    assert!(violations.contains(&VmId::from("vm1")));
}

#[test]
fn preferred_host_accounts_for_moves_already_planned_this_cycle() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 0.0, 0.0)
        .vm("vm1", "appvm01", "h1", 100.0, 100.0)
        .vm("vm2", "appvm02", "h1", 100.0, 100.0)
        .build();

    let engine = ConstraintEngine::new(&snapshot);
    let first_target = engine.preferred_host(&VmId::from("vm1"), &[]);
    assert_eq!(first_target, Some(HostId::from("h2")));
}

#[test]
fn preferred_host_returns_none_when_no_safe_move_exists() {
    // A single active host leaves no candidate target at all.
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 0.0, 0.0)
        .vm("vm1", "appvm01", "h1", 100.0, 100.0)
        .build();

    let engine = ConstraintEngine::new(&snapshot);
    assert_eq!(engine.preferred_host(&VmId::from("vm1"), &[]), None);
}

#[test]
fn short_vm_names_are_skipped_from_grouping() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 0.0, 0.0)
        .vm("vm1", "ab", "h1", 100.0, 100.0)
        .build();

    let engine = ConstraintEngine::new(&snapshot);
    assert!(engine.groups().is_empty());
}
