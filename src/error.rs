//! Typed error taxonomy for the planning kernel.
//!
//! Only two variants are fatal to a planning cycle: [`DrsError::Connect`] aborts before
//! planning begins, and [`DrsError::Invariant`] aborts mid-cycle and surfaces the error
//! rather than risk returning a partially-consistent plan. Every other failure mode
//! described in the core spec (partial metric failures, placement inconsistencies,
//! degenerate constraint computation) is handled by degrading and logging a warning at
//! the call site, never by constructing one of these variants.

use crate::model::{HostId, VmId};

#[derive(Debug, thiserror::Error)]
pub enum DrsError {
    #[error("failed to connect to hypervisor endpoint {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("planner invariant violated: {0}")]
    Invariant(String),
}

impl DrsError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        DrsError::Invariant(msg.into())
    }
}

/// Non-fatal condition worth surfacing to the operator without aborting the cycle.
/// Accumulated on `Plan` and printed alongside the summary table.
#[derive(Debug, Clone)]
pub struct Warning {
    pub component: &'static str,
    pub message: String,
}

impl Warning {
    pub fn new(component: &'static str, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }

    pub fn host_missing(component: &'static str, host_id: &HostId) -> Self {
        Self::new(component, format!("host '{host_id}' has no current metrics, degrading to 0"))
    }

    pub fn vm_missing(component: &'static str, vm_id: &VmId) -> Self {
        Self::new(component, format!("vm '{vm_id}' has no current metrics, degrading to 0"))
    }
}

pub type Result<T> = std::result::Result<T, DrsError>;
