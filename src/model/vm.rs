//! Virtual machine state as tracked by the planning kernel.

use serde::Serialize;

use super::ids::{HostId, VmId};

/// A powered-on, non-template virtual machine and its current absolute resource usage.
#[derive(Debug, Clone, Serialize)]
pub struct Vm {
    pub id: VmId,
    pub name: String,
    pub current_host_id: HostId,

    pub cpu_abs_usage_mhz: f64,
    /// Guest-reported memory usage. Contributes to a host's *simulated* overlay only;
    /// never substituted for the host's own authoritative memory counter.
    pub memory_abs_usage_mb: f64,
    pub disk_io_abs_usage_mbps: f64,
    pub network_io_abs_usage_mbps: f64,
}
