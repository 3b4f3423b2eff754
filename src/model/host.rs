//! Physical host state and derived utilization.

use std::collections::BTreeSet;

use serde::Serialize;

use super::ids::{HostId, VmId};

/// Default disk I/O capacity (MBps) assumed when the hypervisor does not report one.
pub const DEFAULT_DISK_CAPACITY_MBPS: f64 = 1000.0;

/// Default network capacity (MBps) assumed when pNIC link speeds cannot be summed.
pub const DEFAULT_NETWORK_CAPACITY_MBPS: f64 = 1000.0;

/// A physical host, its capacities, its current absolute usage, and the VMs placed on it.
///
/// Derived percentage fields are computed on demand rather than stored, so that a host
/// built from the live snapshot and one produced by [`crate::snapshot::ClusterSnapshot::snapshot_with_applied`]
/// never disagree about how a percentage is derived.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub id: HostId,
    pub name: String,

    pub cpu_capacity_mhz: f64,
    pub memory_capacity_mb: f64,
    pub disk_io_capacity_mbps: f64,
    pub network_capacity_mbps: f64,

    pub cpu_abs_usage_mhz: f64,
    /// Authoritative from the host's own reported overall memory usage counter.
    /// Never the sum of guest memory usage across the VMs placed on this host.
    pub memory_abs_usage_mb: f64,
    pub disk_io_abs_usage_mbps: f64,
    pub network_io_abs_usage_mbps: f64,

    pub vms: BTreeSet<VmId>,
}

impl Host {
    pub fn cpu_usage_pct(&self) -> f64 {
        pct(self.cpu_abs_usage_mhz, self.cpu_capacity_mhz)
    }

    pub fn memory_usage_pct(&self) -> f64 {
        pct(self.memory_abs_usage_mb, self.memory_capacity_mb)
    }

    pub fn disk_usage_pct(&self) -> f64 {
        pct(self.disk_io_abs_usage_mbps, self.disk_io_capacity_mbps)
    }

    pub fn network_usage_pct(&self) -> f64 {
        pct(self.network_io_abs_usage_mbps, self.network_capacity_mbps)
    }
}

fn pct(usage: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        0.0
    } else {
        usage / capacity * 100.0
    }
}
