//! Enforces "same-prefix VMs are spread across hosts with at most 1 host-count
//! difference between any two hosts".
//!
//! VMs are grouped by name prefix; a group is in violation when the spread between its
//! most- and least-loaded host exceeds 1. The engine proposes a move for an existing
//! violation rather than gating a new placement.

use std::collections::{BTreeMap, BTreeSet};

use crate::logging::CONSTRAINT;
use crate::model::{HostId, MigrationIntent, VmId};
use crate::snapshot::ClusterSnapshot;

pub struct ConstraintEngine<'a> {
    snapshot: &'a ClusterSnapshot,
    groups: BTreeMap<String, BTreeSet<VmId>>,
}

impl<'a> ConstraintEngine<'a> {
    pub fn new(snapshot: &'a ClusterSnapshot) -> Self {
        let groups = Self::group_vms(snapshot);
        Self { snapshot, groups }
    }

    fn group_vms(snapshot: &ClusterSnapshot) -> BTreeMap<String, BTreeSet<VmId>> {
        let mut groups: BTreeMap<String, BTreeSet<VmId>> = BTreeMap::new();
        for vm in snapshot.vms() {
            if vm.name.len() < 3 {
                CONSTRAINT.warn(format!("vm '{}' has a name too short to group, skipping", vm.name));
                continue;
            }
            let prefix = snapshot.prefix_of(&vm.name).to_string();
            groups.entry(prefix).or_default().insert(vm.id.clone());
        }
        groups
    }

    pub fn groups(&self) -> &BTreeMap<String, BTreeSet<VmId>> {
        &self.groups
    }

    /// Every VM on a host at the current group-count maximum, for every group whose
    /// max-min spread exceeds 1. De-duplicated and returned in a stable order.
    pub fn compute_violations(&self) -> Vec<VmId> {
        let mut violations = BTreeSet::new();
        for group in self.groups.values() {
            let counts = self.group_counts(group, &[]);
            if counts.is_empty() {
                continue;
            }
            let max = *counts.values().max().unwrap();
            let min = *counts.values().min().unwrap();
            if max - min > 1 {
                for vm_id in group {
                    if let Some(vm) = self.snapshot.vm_by_id(vm_id) {
                        if counts.get(&vm.current_host_id).copied().unwrap_or(0) == max {
                            violations.insert(vm_id.clone());
                        }
                    }
                }
            }
        }
        violations.into_iter().collect()
    }

    /// Finds a target host for `vm_id` that satisfies anti-affinity once `planned_intents`
    /// already issued this cycle are accounted for. `None` is a legal "no safe move" result.
    pub fn preferred_host(&self, vm_id: &VmId, planned_intents: &[MigrationIntent]) -> Option<HostId> {
        let vm = self.snapshot.vm_by_id(vm_id)?;
        let prefix = self.snapshot.prefix_of(&vm.name).to_string();
        let group = self.groups.get(&prefix)?;
        let counts = self.group_counts(group, planned_intents);
        let source = effective_host(vm_id, vm.current_host_id.clone(), planned_intents);

        let mut candidates: Vec<HostId> = self
            .snapshot
            .host_ids()
            .filter(|h| **h != source)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| self.host_name(a).cmp(self.host_name(b)));

        let mut best: Option<(HostId, u32)> = None;
        for host in &candidates {
            let mut simulated = counts.clone();
            if let Some(c) = simulated.get_mut(&source) {
                *c = c.saturating_sub(1);
            }
            *simulated.entry(host.clone()).or_insert(0) += 1;
            if max_min_diff(&simulated) <= 1 {
                let current = counts.get(host).copied().unwrap_or(0);
                if best.as_ref().map_or(true, |(_, c)| current < *c) {
                    best = Some((host.clone(), current));
                }
            }
        }
        if let Some((host, _)) = best {
            return Some(host);
        }

        let source_count = counts.get(&source).copied().unwrap_or(0);
        let mut fallback: Option<(HostId, u32)> = None;
        for host in &candidates {
            let current = counts.get(host).copied().unwrap_or(0);
            if current < source_count && fallback.as_ref().map_or(true, |(_, c)| current < *c) {
                fallback = Some((host.clone(), current));
            }
        }
        fallback.map(|(host, _)| host)
    }

    /// Used by the balancing pass: would moving `vm_id` to `target_host_id`, on top of
    /// `planned_intents` already issued this cycle, keep its group's spread at most 1?
    pub fn is_aa_safe(&self, vm_id: &VmId, target_host_id: &HostId, planned_intents: &[MigrationIntent]) -> bool {
        let Some(vm) = self.snapshot.vm_by_id(vm_id) else {
            return true;
        };
        let prefix = self.snapshot.prefix_of(&vm.name).to_string();
        let Some(group) = self.groups.get(&prefix) else {
            return true;
        };
        let mut counts = self.group_counts(group, planned_intents);
        let source = effective_host(vm_id, vm.current_host_id.clone(), planned_intents);
        if let Some(c) = counts.get_mut(&source) {
            *c = c.saturating_sub(1);
        }
        *counts.entry(target_host_id.clone()).or_insert(0) += 1;
        max_min_diff(&counts) <= 1
    }

    fn host_name(&self, host_id: &HostId) -> String {
        self.snapshot
            .host_by_id(host_id)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| host_id.to_string())
    }

    /// Group counts across every active host, accounting for `planned_intents` already
    /// issued this cycle (a VM's effective host is its planned target if one exists).
    fn group_counts(&self, group: &BTreeSet<VmId>, planned_intents: &[MigrationIntent]) -> BTreeMap<HostId, u32> {
        let mut counts: BTreeMap<HostId, u32> = self.snapshot.host_ids().map(|h| (h.clone(), 0)).collect();
        for vm_id in group {
            let Some(vm) = self.snapshot.vm_by_id(vm_id) else {
                continue;
            };
            let host = effective_host(vm_id, vm.current_host_id.clone(), planned_intents);
            if let Some(c) = counts.get_mut(&host) {
                *c += 1;
            }
        }
        counts
    }
}

/// A VM's host once `planned_intents` are accounted for: its planned target if it has
/// one this cycle, otherwise its current host.
fn effective_host(vm_id: &VmId, current_host_id: HostId, planned_intents: &[MigrationIntent]) -> HostId {
    planned_intents
        .iter()
        .find(|intent| &intent.vm_id == vm_id)
        .map(|intent| intent.target_host_id.clone())
        .unwrap_or(current_host_id)
}

fn max_min_diff(counts: &BTreeMap<HostId, u32>) -> u32 {
    if counts.is_empty() {
        return 0;
    }
    let max = *counts.values().max().unwrap();
    let min = *counts.values().min().unwrap();
    max - min
}
