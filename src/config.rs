//! Runtime configuration: the CLI surface and the single typed value built from it.
//!
//! `Args` is parsed once from the command line; `RunConfig::from_args` builds the
//! single typed value every other component reads from. There is no config file: the
//! cluster topology comes from the hypervisor endpoint at run time.

use std::time::Duration;

use clap::Parser;

use crate::error::Result;
use crate::model::{Resource, ResourceSet};

/// Which passes a planning cycle runs, per `--balance` / `--apply-anti-affinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    AntiAffinityOnly,
    Balance,
}

const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "fleet-drs", about = "Resource-balancing migration planner for a hypervisor cluster")]
pub struct Args {
    /// Hypervisor management endpoint, e.g. https://vcenter.example.com
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub username: String,

    /// Prompted interactively when omitted.
    #[arg(long)]
    pub password: Option<String>,

    /// Log intents instead of invoking the migration RPC.
    #[arg(long)]
    pub dry_run: bool,

    /// 1 (conservative) through 5 (aggressive); unknown values default to 3.
    #[arg(long, default_value_t = 3)]
    pub aggressiveness: u8,

    /// Run the full balancing path, including the anti-affinity pass.
    #[arg(long)]
    pub balance: bool,

    /// Run only the anti-affinity pass.
    #[arg(long = "apply-anti-affinity")]
    pub apply_anti_affinity: bool,

    /// Comma-separated subset of cpu,memory,disk,network. Default: all four.
    #[arg(long)]
    pub metrics: Option<ResourceSet>,

    /// Bypass the anti-affinity safety check during balancing target selection.
    #[arg(long = "ignore-anti-affinity")]
    pub ignore_anti_affinity: bool,

    /// Overrides the default 20-intent cap.
    #[arg(long, default_value_t = 20)]
    pub max_migrations: u32,

    /// Repeatable: -v for debug, -vv for trace.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// The single typed configuration value threaded through the CLI and into
/// `MigrationPlanner`/`LoadEvaluator`. No component reads the environment or global
/// state directly; everything a planning cycle needs comes from this value.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub aggressiveness: u8,
    pub metrics: Vec<Resource>,
    pub max_migrations: u32,
    pub ignore_anti_affinity: bool,
    pub mode: RunMode,
    pub dry_run: bool,
    pub deadline: Duration,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<RunConfig> {
        let metrics = args
            .metrics
            .as_ref()
            .map(|ResourceSet(resources)| resources.clone())
            .unwrap_or_else(|| Resource::ALL.to_vec());
        let mode = if args.apply_anti_affinity && !args.balance {
            RunMode::AntiAffinityOnly
        } else {
            RunMode::Balance
        };
        Ok(RunConfig {
            aggressiveness: args.aggressiveness,
            metrics,
            max_migrations: args.max_migrations,
            ignore_anti_affinity: args.ignore_anti_affinity,
            mode,
            dry_run: args.dry_run,
            deadline: DEFAULT_DEADLINE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            endpoint: "https://host.example.com".to_string(),
            username: "admin".to_string(),
            password: Some("secret".to_string()),
            dry_run: false,
            aggressiveness: 3,
            balance: false,
            apply_anti_affinity: false,
            metrics: None,
            ignore_anti_affinity: false,
            max_migrations: 20,
            verbose: 0,
        }
    }

    #[test]
    fn defaults_to_balance_mode() {
        let config = RunConfig::from_args(&base_args()).unwrap();
        assert_eq!(config.mode, RunMode::Balance);
        assert_eq!(config.metrics.len(), 4);
    }

    #[test]
    fn apply_anti_affinity_without_balance_restricts_mode() {
        let mut args = base_args();
        args.apply_anti_affinity = true;
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.mode, RunMode::AntiAffinityOnly);
    }

    #[test]
    fn balance_flag_wins_over_apply_anti_affinity() {
        let mut args = base_args();
        args.apply_anti_affinity = true;
        args.balance = true;
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.mode, RunMode::Balance);
    }
}
