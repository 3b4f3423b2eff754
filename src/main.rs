//! CLI entry point: parses arguments, builds a `RunConfig`, wires the hypervisor
//! adapter, drives one planning cycle, and reports results.

mod hypervisor;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use fleet_drs::config::{Args, RunConfig};
use fleet_drs::executor::{DryRunExecutor, LoggingExecutor, MigrationExecutor};
use fleet_drs::logging;
use fleet_drs::planner::MigrationPlanner;
use fleet_drs::report;
use fleet_drs::snapshot::ClusterSnapshot;

use hypervisor::HypervisorClient;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let password = match &args.password {
        Some(password) => password.clone(),
        None => prompt_password()?,
    };

    let config = RunConfig::from_args(&args).context("building run configuration")?;

    let client = HypervisorClient::connect(&args.endpoint, &args.username, &password)
        .with_context(|| format!("while connecting to {}", args.endpoint))?;
    let client = Arc::new(client);
    let deadline = Instant::now() + config.deadline;
    let snapshot = ClusterSnapshot::build(client.as_ref(), client.clone(), deadline)
        .context("building cluster snapshot")?;

    print!("{}", report::render_cluster_table(&args.endpoint, &snapshot));

    let planner = MigrationPlanner::new(&snapshot, &config);
    let plan = planner.plan();

    if plan.is_empty() {
        log::info!("No migrations needed.");
        return Ok(());
    }

    print!("{}", report::render_plan_table(&snapshot, &plan));

    if config.dry_run {
        let mut file = std::fs::File::create("plan.csv").context("writing plan.csv")?;
        report::write_plan_csv(&snapshot, &plan, &mut file).context("serializing plan.csv")?;
        file.flush().ok();
    }

    let results = if config.dry_run {
        DryRunExecutor.execute(&plan)
    } else {
        LoggingExecutor::new(client.clone()).execute(&plan)
    };
    let failures = results
        .iter()
        .filter(|r| r.outcome == fleet_drs::executor::MigrationOutcome::Failed)
        .count();
    if failures > 0 {
        log::warn!("{failures} of {} migrations reported failure", results.len());
    }

    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end().to_string())
}
