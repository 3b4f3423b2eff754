//! Shared test fixture: an in-memory `InventorySource`/`MetricsSource` pair, so
//! integration tests can build a `ClusterSnapshot` without a live hypervisor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fleet_drs::error::Result;
use fleet_drs::inventory::{HostRef, InventorySource, VmRef};
use fleet_drs::metrics::{HostMetrics, MetricsSource, VmMetrics};
use fleet_drs::model::{HostId, VmId};
use fleet_drs::snapshot::ClusterSnapshot;

#[derive(Clone)]
struct HostFixture {
    name: String,
    cpu_cap_mhz: f64,
    memory_cap_mb: f64,
    cpu_abs_mhz: f64,
    memory_abs_mb: f64,
}

#[derive(Clone)]
struct VmFixture {
    name: String,
    host_id: HostId,
    cpu_abs_mhz: f64,
    memory_abs_mb: f64,
}

#[derive(Clone, Default)]
struct FixtureSource {
    hosts: HashMap<HostId, HostFixture>,
    vms: HashMap<VmId, VmFixture>,
}

impl InventorySource for FixtureSource {
    fn active_hosts(&self) -> Result<Vec<HostRef>> {
        Ok(self
            .hosts
            .iter()
            .map(|(id, h)| HostRef { id: id.clone(), name: h.name.clone() })
            .collect())
    }

    fn powered_on_vms(&self) -> Result<Vec<VmRef>> {
        Ok(self
            .vms
            .iter()
            .map(|(id, v)| VmRef {
                id: id.clone(),
                name: v.name.clone(),
                current_host_id: v.host_id.clone(),
            })
            .collect())
    }
}

impl MetricsSource for FixtureSource {
    fn host_metrics(&self, host_id: &HostId) -> Option<HostMetrics> {
        self.hosts.get(host_id).map(|h| HostMetrics {
            cpu_abs_mhz: h.cpu_abs_mhz,
            memory_abs_mb: h.memory_abs_mb,
            disk_abs_mbps: 0.0,
            network_abs_mbps: 0.0,
            cpu_cap_mhz: h.cpu_cap_mhz,
            memory_cap_mb: h.memory_cap_mb,
            disk_cap_mbps: 0.0,
            network_cap_mbps: 0.0,
        })
    }

    fn vm_metrics(&self, vm_id: &VmId) -> Option<VmMetrics> {
        self.vms.get(vm_id).map(|v| VmMetrics {
            cpu_abs_mhz: v.cpu_abs_mhz,
            memory_abs_mb: v.memory_abs_mb,
            disk_abs_mbps: 0.0,
            network_abs_mbps: 0.0,
        })
    }
}

/// Builds small clusters for tests: `.host(id, name, cpu_cap, mem_cap, cpu_pct, mem_pct)`
/// then `.vm(id, name, host_id, cpu_pct_of_host, mem_pct_of_host)`, percentages already
/// converted to absolute usage against the host capacities given.
#[derive(Default)]
pub struct Fixture {
    source: FixtureSource,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, id: &str, name: &str, cpu_cap_mhz: f64, memory_cap_mb: f64, cpu_abs_mhz: f64, memory_abs_mb: f64) -> Self {
        self.source.hosts.insert(
            HostId::from(id),
            HostFixture {
                name: name.to_string(),
                cpu_cap_mhz,
                memory_cap_mb,
                cpu_abs_mhz,
                memory_abs_mb,
            },
        );
        self
    }

    pub fn vm(mut self, id: &str, name: &str, host_id: &str, cpu_abs_mhz: f64, memory_abs_mb: f64) -> Self {
        self.source.vms.insert(
            VmId::from(id),
            VmFixture {
                name: name.to_string(),
                host_id: HostId::from(host_id),
                cpu_abs_mhz,
                memory_abs_mb,
            },
        );
        self
    }

    pub fn build(self) -> ClusterSnapshot {
        let deadline = Instant::now() + Duration::from_secs(5);
        let source = Arc::new(self.source);
        ClusterSnapshot::build(source.as_ref(), source.clone(), deadline).expect("fixture snapshot should build")
    }
}
