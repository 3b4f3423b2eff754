//! `InventorySource` boundary: enumerates the hosts and VMs a planning cycle considers.
//!
//! Implementations live outside this crate's core (connection lifecycle, authenticated
//! RPC session, and duck-typed-to-typed translation of hypervisor handles are out of
//! scope here per the top-level spec). What the core needs is the already-filtered,
//! already-validated shape below — never a raw hypervisor object probed with `hasattr`.

use crate::model::{HostId, VmId};

/// A host as reported by the inventory source, before metrics are attached.
#[derive(Debug, Clone)]
pub struct HostRef {
    pub id: HostId,
    pub name: String,
}

/// A powered-on, non-template VM as reported by the inventory source, before metrics
/// are attached. Carries its current host association so `ClusterSnapshot::build` can
/// populate `Placement` without a second round trip.
#[derive(Debug, Clone)]
pub struct VmRef {
    pub id: VmId,
    pub name: String,
    pub current_host_id: HostId,
}

/// Enumerates the active hosts and powered-on, non-template VMs of a cluster.
pub trait InventorySource {
    /// Hosts whose connection state is "connected".
    fn active_hosts(&self) -> crate::error::Result<Vec<HostRef>>;

    /// VMs that are neither templates nor powered off, each carrying its current host id.
    fn powered_on_vms(&self) -> crate::error::Result<Vec<VmRef>>;
}
