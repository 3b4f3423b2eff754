//! Renders the cluster state summary and plan as aligned text and as CSV.
//!
//! The plain-text tables exist for terminal output; the CSV writer serializes a `Vec`
//! of `#[derive(Serialize)]` rows straight through `csv::Writer`, used here for
//! `--dry-run` artifact capture.

use std::io::Write;

use serde::Serialize;

use crate::model::MigrationIntent;
use crate::snapshot::ClusterSnapshot;

#[derive(Debug, Clone, Serialize)]
struct ClusterRow {
    cluster: String,
    host: String,
    cpu_pct: f64,
    memory_pct: f64,
    storage_io_mbps: f64,
    network_io_mbps: f64,
    vm_count: usize,
}

/// The fixed-column cluster state summary table: cluster, host, cpu%, mem%, storage
/// I/O MBps, net I/O MBps, VM count.
pub fn render_cluster_table(cluster_name: &str, snapshot: &ClusterSnapshot) -> String {
    let rows = cluster_rows(cluster_name, snapshot);
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:<20} {:>8} {:>8} {:>14} {:>14} {:>9}\n",
        "CLUSTER", "HOST", "CPU%", "MEM%", "STORAGE MBPS", "NET MBPS", "VMS"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<16} {:<20} {:>8.1} {:>8.1} {:>14.1} {:>14.1} {:>9}\n",
            row.cluster, row.host, row.cpu_pct, row.memory_pct, row.storage_io_mbps, row.network_io_mbps, row.vm_count
        ));
    }
    out
}

pub fn write_cluster_csv(cluster_name: &str, snapshot: &ClusterSnapshot, writer: impl Write) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in cluster_rows(cluster_name, snapshot) {
        wtr.serialize(&row).map_err(csv_to_io)?;
    }
    wtr.flush()
}

fn cluster_rows(cluster_name: &str, snapshot: &ClusterSnapshot) -> Vec<ClusterRow> {
    snapshot
        .hosts()
        .map(|host| ClusterRow {
            cluster: cluster_name.to_string(),
            host: host.name.clone(),
            cpu_pct: host.cpu_usage_pct(),
            memory_pct: host.memory_usage_pct(),
            storage_io_mbps: host.disk_io_abs_usage_mbps,
            network_io_mbps: host.network_io_abs_usage_mbps,
            vm_count: host.vms.len(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
struct PlanRow {
    vm: String,
    source_host: String,
    target_host: String,
    reason: String,
}

/// The plan table: one row per intent, in plan order.
pub fn render_plan_table(snapshot: &ClusterSnapshot, plan: &[MigrationIntent]) -> String {
    if plan.is_empty() {
        return "No migrations needed.\n".to_string();
    }
    let rows = plan_rows(snapshot, plan);
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:<20} {:<20} {:<12}\n", "VM", "SOURCE", "TARGET", "REASON"));
    for row in rows {
        out.push_str(&format!(
            "{:<20} {:<20} {:<20} {:<12}\n",
            row.vm, row.source_host, row.target_host, row.reason
        ));
    }
    out
}

pub fn write_plan_csv(snapshot: &ClusterSnapshot, plan: &[MigrationIntent], writer: impl Write) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in plan_rows(snapshot, plan) {
        wtr.serialize(&row).map_err(csv_to_io)?;
    }
    wtr.flush()
}

fn plan_rows(snapshot: &ClusterSnapshot, plan: &[MigrationIntent]) -> Vec<PlanRow> {
    plan.iter()
        .map(|intent| PlanRow {
            vm: host_or_vm_name(snapshot.vm_by_id(&intent.vm_id).map(|v| v.name.as_str()), &intent.vm_id.to_string()),
            source_host: host_or_vm_name(
                snapshot.host_by_id(&intent.source_host_id).map(|h| h.name.as_str()),
                &intent.source_host_id.to_string(),
            ),
            target_host: host_or_vm_name(
                snapshot.host_by_id(&intent.target_host_id).map(|h| h.name.as_str()),
                &intent.target_host_id.to_string(),
            ),
            reason: intent.reason.to_string(),
        })
        .collect()
}

fn host_or_vm_name(name: Option<&str>, fallback: &str) -> String {
    name.unwrap_or(fallback).to_string()
}

fn csv_to_io(err: csv::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err)
}

/// Serializes the plan as JSON for an external executor process to consume directly.
pub fn plan_to_json(plan: &[MigrationIntent]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plan)
}
