//! End-to-end planning cycle scenarios and the invariants from the testable-properties
//! section: no duplicate intents, cap honored, capacity fit, anti-affinity preservation.

mod support;

use std::collections::HashSet;
use std::time::Duration;

use fleet_drs::config::{RunConfig, RunMode};
use fleet_drs::model::{Reason, Resource};
use fleet_drs::planner::MigrationPlanner;
use support::Fixture;

fn config(mode: RunMode, aggressiveness: u8, max_migrations: u32) -> RunConfig {
    RunConfig {
        aggressiveness,
        metrics: Resource::ALL.to_vec(),
        max_migrations,
        ignore_anti_affinity: false,
        mode,
        dry_run: true,
        deadline: Duration::from_secs(5),
    }
}

#[test]
fn idle_balanced_cluster_produces_an_empty_plan() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 5_000.0, 5_000.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 5_000.0, 5_000.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 5_000.0, 5_000.0)
        .build();

    let cfg = config(RunMode::Balance, 3, 20);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();
    assert!(plan.is_empty());
}

#[test]
fn pure_anti_affinity_violation_spreads_the_group_across_four_hosts() {
    let mut fixture = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 600.0, 600.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 0.0, 0.0)
        .host("h4", "host-4", 10_000.0, 10_000.0, 0.0, 0.0);
    for i in 1..=6 {
        fixture = fixture.vm(&format!("vm{i}"), &format!("appvm0{i}"), "h1", 100.0, 100.0);
    }
    let snapshot = fixture.build();

    let cfg = config(RunMode::AntiAffinityOnly, 3, 20);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();

    assert!(plan.iter().all(|i| i.reason == Reason::AntiAffinity));
    assert!((4..=5).contains(&plan.len()));

    let vm_ids: HashSet<_> = plan.iter().map(|i| i.vm_id.clone()).collect();
    assert_eq!(vm_ids.len(), plan.len(), "no VM should appear twice");
}

#[test]
fn pure_cpu_imbalance_moves_a_vm_off_the_hot_host() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 8_000.0, 5_000.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 1_000.0, 5_000.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 1_000.0, 5_000.0)
        .vm("vm1", "appvm01", "h1", 2_000.0, 500.0)
        .build();

    let cfg = config(RunMode::Balance, 3, 20);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();

    assert!(!plan.is_empty());
    assert!(plan.iter().any(|i| i.reason == Reason::Balance && i.source_host_id == fleet_drs::model::HostId::from("h1")));
    assert!(plan.len() as u32 <= cfg.max_migrations);
}

#[test]
fn cap_enforcement_prioritizes_anti_affinity_intents() {
    let mut fixture = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 9_000.0, 100.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 100.0, 100.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 100.0, 100.0)
        .host("h4", "host-4", 10_000.0, 10_000.0, 100.0, 100.0);
    for i in 1..=6 {
        fixture = fixture.vm(&format!("avm{i}"), &format!("avm0{i}"), "h1", 500.0, 10.0);
    }
    let snapshot = fixture.build();

    let cfg = config(RunMode::Balance, 5, 2);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();

    assert!(plan.len() <= 2);
    assert!(plan.iter().any(|i| i.reason == Reason::AntiAffinity));
}

#[test]
fn no_vm_appears_twice_in_any_plan() {
    let mut fixture = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 8_000.0, 100.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 100.0, 100.0)
        .host("h3", "host-3", 10_000.0, 10_000.0, 100.0, 100.0);
    for i in 1..=4 {
        fixture = fixture.vm(&format!("vm{i}"), &format!("webvm0{i}"), "h1", 800.0, 10.0);
    }
    let snapshot = fixture.build();

    let cfg = config(RunMode::Balance, 5, 20);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();

    let vm_ids: HashSet<_> = plan.iter().map(|i| i.vm_id.clone()).collect();
    assert_eq!(vm_ids.len(), plan.len());
}

#[test]
fn single_host_cluster_never_produces_a_plan() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 9_500.0, 9_500.0)
        .vm("vm1", "appvm01", "h1", 100.0, 100.0)
        .build();

    let cfg = config(RunMode::Balance, 5, 20);
    let plan = MigrationPlanner::new(&snapshot, &cfg).plan();
    assert!(plan.is_empty());
}

#[test]
fn planning_twice_on_the_same_snapshot_is_idempotent() {
    let snapshot = Fixture::new()
        .host("h1", "host-1", 10_000.0, 10_000.0, 8_000.0, 5_000.0)
        .host("h2", "host-2", 10_000.0, 10_000.0, 1_000.0, 5_000.0)
        .vm("vm1", "appvm01", "h1", 2_000.0, 500.0)
        .build();

    let cfg = config(RunMode::Balance, 3, 20);
    let planner = MigrationPlanner::new(&snapshot, &cfg);
    let first = planner.plan();
    let second = planner.plan();

    let first_ids: Vec<_> = first.iter().map(|i| i.vm_id.clone()).collect();
    let second_ids: Vec<_> = second.iter().map(|i| i.vm_id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}
