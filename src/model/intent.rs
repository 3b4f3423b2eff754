//! A proposed, not-yet-executed migration.

use serde::Serialize;

use super::ids::{HostId, VmId};

/// Why a migration was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reason {
    AntiAffinity,
    Balance,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Reason::AntiAffinity => write!(f, "anti-affinity"),
            Reason::Balance => write!(f, "balance"),
        }
    }
}

/// A single proposed move: `vm_id` from `source_host_id` to `target_host_id`.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationIntent {
    pub vm_id: VmId,
    pub source_host_id: HostId,
    pub target_host_id: HostId,
    pub reason: Reason,
}
