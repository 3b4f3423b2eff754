//! `ClusterSnapshot`: a consistent, immutable-after-construction model of the cluster.
//!
//! Built once per planning cycle from an [`InventorySource`] and a [`MetricsSource`],
//! and passed by reference to every downstream component. Host memory usage is taken
//! from the host's own reported counter rather than summed from guest usage, since the
//! two routinely disagree (ballooning, overhead, host-level services).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use crate::error::{DrsError, Result, Warning};
use crate::inventory::InventorySource;
use crate::load::HostPercentages;
use crate::logging::SNAPSHOT;
use crate::metrics::{collect_host_metrics, collect_vm_metrics, HostMetrics, MetricsSource, VmMetrics};
use crate::model::affinity::prefix_of;
use crate::model::host::{Host, DEFAULT_DISK_CAPACITY_MBPS, DEFAULT_NETWORK_CAPACITY_MBPS};
use crate::model::{HostId, MigrationIntent, Vm, VmId};

/// A per-host CPU/memory percentage overlay produced by simulating a set of
/// not-yet-executed migration intents. Disk and network percentages are not part of
/// the overlay: I/O is not reliably additive across migrations planned in the same
/// cycle, so the planner passes those through from the live snapshot unchanged.
#[derive(Debug, Clone)]
pub struct SimulatedLoad {
    /// Aligned with `ClusterSnapshot::host_ids()` order.
    pub cpu_pct: Vec<f64>,
    /// Aligned with `ClusterSnapshot::host_ids()` order.
    pub memory_pct: Vec<f64>,
    /// The same CPU/memory overlay, keyed by host, with disk/network passed through
    /// from the live snapshot. Used wherever a host→percentage map (rather than an
    /// array aligned to `host_ids()`) is needed after simulating a set of intents.
    pub percentages: BTreeMap<HostId, HostPercentages>,
}

#[derive(Debug)]
pub struct ClusterSnapshot {
    hosts: IndexMap<HostId, Host>,
    vms: IndexMap<VmId, Vm>,
    warnings: Vec<Warning>,
}

impl ClusterSnapshot {
    /// Enumerates active hosts and powered-on, non-template VMs, fetches their absolute
    /// usage and capacities, and populates placement. VMs are annotated first so that
    /// a host's VM set is known by the time the host itself is annotated.
    pub fn build(
        inventory: &dyn InventorySource,
        metrics: Arc<dyn MetricsSource>,
        deadline: Instant,
    ) -> Result<Self> {
        let host_refs = inventory.active_hosts()?;
        if host_refs.is_empty() {
            return Err(DrsError::Connect {
                endpoint: "inventory".to_string(),
                message: "no active hosts reported by inventory source".to_string(),
            });
        }
        let vm_refs = inventory.powered_on_vms()?;

        let mut warnings = Vec::new();
        let mut hosts: IndexMap<HostId, Host> = IndexMap::new();
        for host_ref in &host_refs {
            hosts.insert(
                host_ref.id.clone(),
                Host {
                    id: host_ref.id.clone(),
                    name: host_ref.name.clone(),
                    cpu_capacity_mhz: 0.0,
                    memory_capacity_mb: 0.0,
                    disk_io_capacity_mbps: DEFAULT_DISK_CAPACITY_MBPS,
                    network_capacity_mbps: DEFAULT_NETWORK_CAPACITY_MBPS,
                    cpu_abs_usage_mhz: 0.0,
                    memory_abs_usage_mb: 0.0,
                    disk_io_abs_usage_mbps: 0.0,
                    network_io_abs_usage_mbps: 0.0,
                    vms: BTreeSet::new(),
                },
            );
        }

        // Phase 1: VM annotation. VMs whose reported host is not among the active
        // hosts are a placement inconsistency: log and skip the entity, never abort.
        let host_ids: Vec<HostId> = vm_refs.iter().map(|v| v.current_host_id.clone()).collect();
        let vm_ids: Vec<VmId> = vm_refs.iter().map(|v| v.id.clone()).collect();
        let vm_metrics = collect_vm_metrics(metrics.clone(), &vm_ids, deadline);

        let mut vms: IndexMap<VmId, Vm> = IndexMap::new();
        for ((vm_ref, host_id), metrics) in vm_refs.into_iter().zip(host_ids).zip(vm_metrics) {
            if !hosts.contains_key(&host_id) {
                warnings.push(Warning::new(
                    "Snapshot",
                    format!(
                        "vm '{}' references host '{}' which is not active, skipping",
                        vm_ref.id, host_id
                    ),
                ));
                continue;
            }
            let metrics = metrics.unwrap_or_else(|| {
                warnings.push(Warning::vm_missing("Snapshot", &vm_ref.id));
                VmMetrics::default()
            });
            hosts.get_mut(&host_id).unwrap().vms.insert(vm_ref.id.clone());
            vms.insert(
                vm_ref.id.clone(),
                Vm {
                    id: vm_ref.id,
                    name: vm_ref.name,
                    current_host_id: host_id,
                    cpu_abs_usage_mhz: metrics.cpu_abs_mhz,
                    memory_abs_usage_mb: metrics.memory_abs_mb,
                    disk_io_abs_usage_mbps: metrics.disk_abs_mbps,
                    network_io_abs_usage_mbps: metrics.network_abs_mbps,
                },
            );
        }

        // Phase 2: host annotation, now that VM placement is known.
        let host_id_list: Vec<HostId> = hosts.keys().cloned().collect();
        let host_metrics = collect_host_metrics(metrics, &host_id_list, deadline);
        for (host_id, metrics) in host_id_list.iter().zip(host_metrics) {
            let metrics = metrics.unwrap_or_else(|| {
                warnings.push(Warning::host_missing("Snapshot", host_id));
                HostMetrics::default()
            });
            let host = hosts.get_mut(host_id).unwrap();
            host.cpu_capacity_mhz = metrics.cpu_cap_mhz;
            host.memory_capacity_mb = metrics.memory_cap_mb;
            if metrics.disk_cap_mbps > 0.0 {
                host.disk_io_capacity_mbps = metrics.disk_cap_mbps;
            }
            if metrics.network_cap_mbps > 0.0 {
                host.network_capacity_mbps = metrics.network_cap_mbps;
            }
            host.cpu_abs_usage_mhz = metrics.cpu_abs_mhz;
            host.memory_abs_usage_mb = metrics.memory_abs_mb;
            host.disk_io_abs_usage_mbps = metrics.disk_abs_mbps;
            host.network_io_abs_usage_mbps = metrics.network_abs_mbps;
        }

        for warning in &warnings {
            SNAPSHOT.warn(&warning.message);
        }

        Ok(Self { hosts, vms, warnings })
    }

    pub fn host_by_id(&self, id: &HostId) -> Option<&Host> {
        self.hosts.get(id)
    }

    pub fn vm_by_id(&self, id: &VmId) -> Option<&Vm> {
        self.vms.get(id)
    }

    pub fn vms_on_host(&self, host_id: &HostId) -> Vec<&Vm> {
        match self.hosts.get(host_id) {
            Some(host) => host.vms.iter().filter_map(|id| self.vms.get(id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn prefix_of<'a>(&self, vm_name: &'a str) -> &'a str {
        prefix_of(vm_name)
    }

    /// Stable host ordering shared by every per-host list this crate produces.
    pub fn host_ids(&self) -> impl Iterator<Item = &HostId> {
        self.hosts.keys()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn vms(&self) -> impl Iterator<Item = &Vm> {
        self.vms.values()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Returns a logical overlay reflecting the effect of a single intent. Convenience
    /// wrapper over [`Self::snapshot_with_applied`].
    pub fn apply_simulated(&self, intent: &MigrationIntent) -> SimulatedLoad {
        self.snapshot_with_applied(std::slice::from_ref(intent))
    }

    /// Simulates `intents` against the live snapshot and returns the resulting per-host
    /// CPU/memory percentages, in the same host order as [`Self::host_ids`]. Only CPU
    /// and memory absolute usage move between hosts; the original snapshot is untouched.
    pub fn snapshot_with_applied(&self, intents: &[MigrationIntent]) -> SimulatedLoad {
        let mut cpu_abs: IndexMap<HostId, f64> = self
            .hosts
            .iter()
            .map(|(id, h)| (id.clone(), h.cpu_abs_usage_mhz))
            .collect();
        let mut mem_abs: IndexMap<HostId, f64> = self
            .hosts
            .iter()
            .map(|(id, h)| (id.clone(), h.memory_abs_usage_mb))
            .collect();

        for intent in intents {
            let Some(vm) = self.vms.get(&intent.vm_id) else {
                continue;
            };
            if let Some(v) = cpu_abs.get_mut(&intent.source_host_id) {
                *v -= vm.cpu_abs_usage_mhz;
            }
            if let Some(v) = mem_abs.get_mut(&intent.source_host_id) {
                *v -= vm.memory_abs_usage_mb;
            }
            if let Some(v) = cpu_abs.get_mut(&intent.target_host_id) {
                *v += vm.cpu_abs_usage_mhz;
            }
            if let Some(v) = mem_abs.get_mut(&intent.target_host_id) {
                *v += vm.memory_abs_usage_mb;
            }
        }

        let cpu_pct: Vec<f64> = self
            .hosts
            .values()
            .map(|h| pct(cpu_abs[&h.id], h.cpu_capacity_mhz))
            .collect();
        let memory_pct: Vec<f64> = self
            .hosts
            .values()
            .map(|h| pct(mem_abs[&h.id], h.memory_capacity_mb))
            .collect();

        let percentages = self
            .hosts
            .values()
            .zip(cpu_pct.iter())
            .zip(memory_pct.iter())
            .map(|((h, cpu), memory)| {
                (
                    h.id.clone(),
                    HostPercentages {
                        cpu: *cpu,
                        memory: *memory,
                        disk: h.disk_usage_pct(),
                        network: h.network_usage_pct(),
                    },
                )
            })
            .collect();

        SimulatedLoad { cpu_pct, memory_pct, percentages }
    }
}

fn pct(usage: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        0.0
    } else {
        usage / capacity * 100.0
    }
}
