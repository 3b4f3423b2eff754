//! Orchestrates a single planning cycle: anti-affinity pass, load simulation,
//! balancing pass, migration cap.
//!
//! A single greedy pass: anti-affinity violations are resolved first, then the
//! resulting (simulated) load is evaluated for balance and any residual imbalance is
//! addressed, then the combined plan is capped. There is no iterative rebalancing loop.

use std::collections::BTreeSet;

use crate::config::{RunConfig, RunMode};
use crate::constraint::ConstraintEngine;
use crate::load::LoadEvaluator;
use crate::logging::PLANNER;
use crate::model::{HostId, MigrationIntent, Reason, Resource, VmId};
use crate::snapshot::ClusterSnapshot;

pub struct MigrationPlanner<'a> {
    snapshot: &'a ClusterSnapshot,
    config: &'a RunConfig,
}

impl<'a> MigrationPlanner<'a> {
    pub fn new(snapshot: &'a ClusterSnapshot, config: &'a RunConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn plan(&self) -> Vec<MigrationIntent> {
        let constraint = ConstraintEngine::new(self.snapshot);

        let mut planned: Vec<MigrationIntent> = Vec::new();
        let mut planned_vms: BTreeSet<VmId> = BTreeSet::new();

        let aa_intents = self.plan_anti_affinity(&constraint, &mut planned_vms);
        PLANNER.info(format!("anti-affinity pass proposed {} move(s)", aa_intents.len()));
        planned.extend(aa_intents);

        if self.config.mode == RunMode::Balance {
            let balance_intents = self.plan_balancing(&constraint, &planned, &mut planned_vms);
            PLANNER.info(format!("balancing pass proposed {} move(s)", balance_intents.len()));
            planned.extend(balance_intents);
        }

        self.enforce_cap(planned)
    }

    fn plan_anti_affinity(
        &self,
        constraint: &ConstraintEngine<'_>,
        planned_vms: &mut BTreeSet<VmId>,
    ) -> Vec<MigrationIntent> {
        let mut intents = Vec::new();
        for vm_id in constraint.compute_violations() {
            if planned_vms.contains(&vm_id) {
                continue;
            }
            let Some(vm) = self.snapshot.vm_by_id(&vm_id) else {
                continue;
            };
            let Some(target) = constraint.preferred_host(&vm_id, &intents) else {
                continue;
            };
            if !self.fits_capacity(&target, vm.cpu_abs_usage_mhz, vm.memory_abs_usage_mb) {
                continue;
            }
            let intent = MigrationIntent {
                vm_id: vm_id.clone(),
                source_host_id: vm.current_host_id.clone(),
                target_host_id: target,
                reason: Reason::AntiAffinity,
            };
            planned_vms.insert(vm_id);
            intents.push(intent);
        }
        intents
    }

    fn plan_balancing(
        &self,
        constraint: &ConstraintEngine<'_>,
        aa_intents: &[MigrationIntent],
        planned_vms: &mut BTreeSet<VmId>,
    ) -> Vec<MigrationIntent> {
        let simulated = if aa_intents.is_empty() {
            None
        } else {
            Some(self.snapshot.snapshot_with_applied(aa_intents))
        };

        let evaluator = LoadEvaluator::new(self.snapshot);
        let imbalances = evaluator.evaluate_imbalance(&self.config.metrics, self.config.aggressiveness, simulated.as_ref());
        let percentages = simulated
            .as_ref()
            .map(|s| s.percentages.clone())
            .unwrap_or_else(|| evaluator.host_percentage_map());

        let mut intents: Vec<MigrationIntent> = Vec::new();
        let mut all_planned: Vec<MigrationIntent> = aa_intents.to_vec();

        let top_n = self.config.aggressiveness.max(1) as usize;

        for (resource, detail) in &imbalances {
            if !detail.is_imbalanced {
                continue;
            }
            let source_hosts: Vec<HostId> = self
                .snapshot
                .hosts()
                .filter(|h| percentage_for(*resource, &percentages.get(&h.id).copied().unwrap_or_default()) == detail.max_usage)
                .map(|h| h.id.clone())
                .collect();

            for source in &source_hosts {
                let mut candidates: Vec<&crate::model::Vm> = self.snapshot.vms_on_host(source);
                candidates.sort_by(|a, b| {
                    usage_for(*resource, b).partial_cmp(&usage_for(*resource, a)).unwrap()
                });
                candidates.truncate(top_n);

                for vm in candidates {
                    if planned_vms.contains(&vm.id) {
                        continue;
                    }
                    let Some(target) = self.find_balancing_target(
                        constraint,
                        vm,
                        source,
                        &imbalances,
                        &percentages,
                        &all_planned,
                    ) else {
                        continue;
                    };
                    let intent = MigrationIntent {
                        vm_id: vm.id.clone(),
                        source_host_id: source.clone(),
                        target_host_id: target,
                        reason: Reason::Balance,
                    };
                    planned_vms.insert(vm.id.clone());
                    all_planned.push(intent.clone());
                    intents.push(intent);
                }
            }
        }

        intents
    }

    #[allow(clippy::too_many_arguments)]
    fn find_balancing_target(
        &self,
        constraint: &ConstraintEngine<'_>,
        vm: &crate::model::Vm,
        source: &HostId,
        imbalances: &std::collections::BTreeMap<Resource, crate::load::ImbalanceDetail>,
        percentages: &std::collections::BTreeMap<HostId, crate::load::HostPercentages>,
        planned: &[MigrationIntent],
    ) -> Option<HostId> {
        let mut best: Option<(HostId, f64)> = None;
        for host in self.snapshot.host_ids() {
            if host == source {
                continue;
            }
            if !self.fits_capacity(host, vm.cpu_abs_usage_mhz, vm.memory_abs_usage_mb) {
                continue;
            }
            if !self.config.ignore_anti_affinity && !constraint.is_aa_safe(&vm.id, host, planned) {
                continue;
            }
            let Some(host_pct) = percentages.get(host) else {
                continue;
            };
            let score: f64 = imbalances
                .keys()
                .map(|resource| 100.0 - percentage_for(*resource, host_pct))
                .sum();
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((host.clone(), score));
            }
        }
        best.map(|(host, _)| host)
    }

    /// Projected CPU% and memory% after adding `vm`'s absolute usage to `target`, both
    /// at most 90.
    fn fits_capacity(&self, target: &HostId, cpu_abs_mhz: f64, memory_abs_mb: f64) -> bool {
        let Some(host) = self.snapshot.host_by_id(target) else {
            return false;
        };
        let projected_cpu = pct(host.cpu_abs_usage_mhz + cpu_abs_mhz, host.cpu_capacity_mhz);
        let projected_memory = pct(host.memory_abs_usage_mb + memory_abs_mb, host.memory_capacity_mb);
        projected_cpu <= 90.0 && projected_memory <= 90.0
    }

    fn enforce_cap(&self, mut planned: Vec<MigrationIntent>) -> Vec<MigrationIntent> {
        let cap = self.config.max_migrations as usize;
        if planned.len() <= cap {
            return planned;
        }
        PLANNER.warn(format!(
            "planning cycle produced {} intents, truncating to cap {}",
            planned.len(),
            cap
        ));
        planned.sort_by_key(|i| i.reason != Reason::AntiAffinity);
        planned.truncate(cap);
        planned
    }
}

fn pct(usage: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        0.0
    } else {
        usage / capacity * 100.0
    }
}

fn percentage_for(resource: Resource, pcts: &crate::load::HostPercentages) -> f64 {
    match resource {
        Resource::Cpu => pcts.cpu,
        Resource::Memory => pcts.memory,
        Resource::Disk => pcts.disk,
        Resource::Network => pcts.network,
    }
}

fn usage_for(resource: Resource, vm: &crate::model::Vm) -> f64 {
    match resource {
        Resource::Cpu => vm.cpu_abs_usage_mhz,
        Resource::Memory => vm.memory_abs_usage_mb,
        Resource::Disk => vm.disk_io_abs_usage_mbps,
        Resource::Network => vm.network_io_abs_usage_mbps,
    }
}
