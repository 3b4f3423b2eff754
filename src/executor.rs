//! Consumes a plan and invokes (or, in dry-run mode, merely logs) each migration.
//!
//! Each intent in the plan is committed independently and reports its own
//! success/failure; the batch is not treated as a single transaction.

use crate::logging::EXECUTOR;
use crate::model::MigrationIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub intent: MigrationIntent,
    pub outcome: MigrationOutcome,
    pub detail: Option<String>,
}

/// The boundary to a live hypervisor control plane. Out of scope for this crate's
/// core; a real implementation lives in the deployment that wires this crate up.
pub trait MigrationRpc: Send + Sync {
    fn migrate(&self, intent: &MigrationIntent) -> Result<(), String>;
}

impl<T: MigrationRpc + ?Sized> MigrationRpc for std::sync::Arc<T> {
    fn migrate(&self, intent: &MigrationIntent) -> Result<(), String> {
        (**self).migrate(intent)
    }
}

pub trait MigrationExecutor {
    fn execute(&self, plan: &[MigrationIntent]) -> Vec<ExecutionResult>;
}

/// Logs each intent and reports success without touching a control plane. Used for
/// `--dry-run` and for the test harness.
pub struct DryRunExecutor;

impl MigrationExecutor for DryRunExecutor {
    fn execute(&self, plan: &[MigrationIntent]) -> Vec<ExecutionResult> {
        plan.iter()
            .map(|intent| {
                EXECUTOR.info(format!(
                    "[dry-run] would migrate {} from {} to {} ({})",
                    intent.vm_id, intent.source_host_id, intent.target_host_id, intent.reason
                ));
                ExecutionResult {
                    intent: intent.clone(),
                    outcome: MigrationOutcome::Success,
                    detail: None,
                }
            })
            .collect()
    }
}

/// Executes each intent against an injected [`MigrationRpc`], logging the outcome.
pub struct LoggingExecutor<R: MigrationRpc> {
    rpc: R,
}

impl<R: MigrationRpc> LoggingExecutor<R> {
    pub fn new(rpc: R) -> Self {
        Self { rpc }
    }
}

impl<R: MigrationRpc> MigrationExecutor for LoggingExecutor<R> {
    fn execute(&self, plan: &[MigrationIntent]) -> Vec<ExecutionResult> {
        plan.iter()
            .map(|intent| match self.rpc.migrate(intent) {
                Ok(()) => {
                    EXECUTOR.info(format!(
                        "migrated {} from {} to {} ({})",
                        intent.vm_id, intent.source_host_id, intent.target_host_id, intent.reason
                    ));
                    ExecutionResult {
                        intent: intent.clone(),
                        outcome: MigrationOutcome::Success,
                        detail: None,
                    }
                }
                Err(message) => {
                    EXECUTOR.error(format!(
                        "migration of {} from {} to {} failed: {}",
                        intent.vm_id, intent.source_host_id, intent.target_host_id, message
                    ));
                    ExecutionResult {
                        intent: intent.clone(),
                        outcome: MigrationOutcome::Failed,
                        detail: Some(message),
                    }
                }
            })
            .collect()
    }
}
