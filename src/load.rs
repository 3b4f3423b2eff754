//! Converts absolute snapshot usage into normalized imbalance signals.
//!
//! Reduces raw per-host counters to percentages, then compares the spread between the
//! most- and least-loaded host against an aggressiveness-derived threshold to decide
//! whether a resource is imbalanced.

use std::collections::BTreeMap;

use crate::logging::LOAD;
use crate::model::{HostId, Resource};
use crate::snapshot::{ClusterSnapshot, SimulatedLoad};

/// A host's utilization across all four tracked resources, as a percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPercentages {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ImbalanceDetail {
    pub is_imbalanced: bool,
    pub current_diff: f64,
    pub threshold: f64,
    pub min_usage: f64,
    pub max_usage: f64,
    pub avg_usage: f64,
}

pub struct LoadEvaluator<'a> {
    snapshot: &'a ClusterSnapshot,
}

impl<'a> LoadEvaluator<'a> {
    pub fn new(snapshot: &'a ClusterSnapshot) -> Self {
        Self { snapshot }
    }

    /// Per-resource percentage arrays, ordered exactly as `snapshot.host_ids()`.
    pub fn per_host_percentages(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut cpu = Vec::new();
        let mut memory = Vec::new();
        let mut disk = Vec::new();
        let mut network = Vec::new();
        for host in self.snapshot.hosts() {
            cpu.push(host.cpu_usage_pct());
            memory.push(host.memory_usage_pct());
            disk.push(host.disk_usage_pct());
            network.push(host.network_usage_pct());
        }
        (cpu, memory, disk, network)
    }

    pub fn host_percentage_map(&self) -> BTreeMap<HostId, HostPercentages> {
        self.snapshot
            .hosts()
            .map(|host| {
                (
                    host.id.clone(),
                    HostPercentages {
                        cpu: host.cpu_usage_pct(),
                        memory: host.memory_usage_pct(),
                        disk: host.disk_usage_pct(),
                        network: host.network_usage_pct(),
                    },
                )
            })
            .collect()
    }

    /// The percentage-point difference allowed before a resource is considered
    /// imbalanced at a given aggressiveness level. Unknown levels fall back to level 3.
    pub fn threshold_for(aggressiveness: u8) -> f64 {
        match aggressiveness {
            1 => 25.0,
            2 => 20.0,
            3 => 15.0,
            4 => 10.0,
            5 => 5.0,
            other => {
                LOAD.warn(format!("unknown aggressiveness level {other}, defaulting to level 3"));
                15.0
            }
        }
    }

    pub fn thresholds(resources: &[Resource], aggressiveness: u8) -> BTreeMap<Resource, f64> {
        let threshold = Self::threshold_for(aggressiveness);
        resources.iter().map(|r| (*r, threshold)).collect()
    }

    /// Evaluates imbalance for `resources`. When `overrides` is given, CPU and memory
    /// percentages are taken from the simulated overlay instead of the live snapshot;
    /// disk and network are always read live (simulation never touches them).
    pub fn evaluate_imbalance(
        &self,
        resources: &[Resource],
        aggressiveness: u8,
        overrides: Option<&SimulatedLoad>,
    ) -> BTreeMap<Resource, ImbalanceDetail> {
        let (cpu, memory, disk, network) = self.per_host_percentages();
        let cpu = overrides.map(|o| o.cpu_pct.clone()).unwrap_or(cpu);
        let memory = overrides.map(|o| o.memory_pct.clone()).unwrap_or(memory);

        let threshold = Self::threshold_for(aggressiveness);
        let host_count = self.snapshot.host_count();

        let mut out = BTreeMap::new();
        for resource in resources {
            let values: &[f64] = match resource {
                Resource::Cpu => &cpu,
                Resource::Memory => &memory,
                Resource::Disk => &disk,
                Resource::Network => &network,
            };
            out.insert(*resource, detail_for(values, threshold, host_count));
        }
        out
    }
}

fn detail_for(values: &[f64], threshold: f64, host_count: usize) -> ImbalanceDetail {
    if values.is_empty() {
        return ImbalanceDetail {
            is_imbalanced: false,
            current_diff: 0.0,
            threshold,
            min_usage: 0.0,
            max_usage: 0.0,
            avg_usage: 0.0,
        };
    }
    let min_usage = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_usage = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg_usage = values.iter().sum::<f64>() / values.len() as f64;
    let current_diff = max_usage - min_usage;

    // A single host (or an empty sample) cannot be imbalanced relative to itself.
    let is_imbalanced = host_count >= 2 && current_diff > threshold;

    ImbalanceDetail {
        is_imbalanced,
        current_diff,
        threshold,
        min_usage,
        max_usage,
        avg_usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_table_matches_aggressiveness_levels() {
        assert_eq!(LoadEvaluator::threshold_for(1), 25.0);
        assert_eq!(LoadEvaluator::threshold_for(5), 5.0);
    }

    #[test]
    fn unknown_aggressiveness_falls_back_to_level_three() {
        assert_eq!(LoadEvaluator::threshold_for(9), 15.0);
    }

    #[test]
    fn single_host_sample_is_never_imbalanced() {
        let detail = detail_for(&[90.0], 5.0, 1);
        assert!(!detail.is_imbalanced);
    }

    #[test]
    fn diff_over_threshold_is_imbalanced() {
        let detail = detail_for(&[80.0, 10.0, 10.0], 15.0, 3);
        assert!(detail.is_imbalanced);
        assert_eq!(detail.current_diff, 70.0);
    }

    #[test]
    fn diff_within_threshold_is_balanced() {
        let detail = detail_for(&[55.0, 50.0, 45.0], 15.0, 3);
        assert!(!detail.is_imbalanced);
    }
}
