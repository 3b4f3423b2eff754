//! `MetricsSource` boundary and the bounded-worker-pool collection phase.
//!
//! The raw performance-counter fetcher (the actual RPC to the hypervisor control plane)
//! is out of scope for this crate; only the contract and the fan-out/fan-in shape that
//! [`crate::snapshot::ClusterSnapshot::build`] drives against it live here.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use threadpool::ThreadPool;

use crate::model::{HostId, VmId};

/// Absolute counters for a host, as reported by the hypervisor, already normalized to
/// the canonical units this crate assumes (MHz, MB, MBps).
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMetrics {
    pub cpu_abs_mhz: f64,
    pub memory_abs_mb: f64,
    pub disk_abs_mbps: f64,
    pub network_abs_mbps: f64,
    pub cpu_cap_mhz: f64,
    pub memory_cap_mb: f64,
    pub disk_cap_mbps: f64,
    pub network_cap_mbps: f64,
}

/// Absolute counters for a VM, as reported by the hypervisor.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmMetrics {
    pub cpu_abs_mhz: f64,
    pub memory_abs_mb: f64,
    pub disk_abs_mbps: f64,
    pub network_abs_mbps: f64,
}

/// Returns current absolute usage counters for a host or VM.
///
/// Implementations must convert hypervisor-native units (percent x 100, KBps, bytes) at
/// this boundary; the core assumes already-normalized units. Must be `Send + Sync` since
/// the collection phase fans fetches out across a thread pool.
pub trait MetricsSource: Send + Sync {
    fn host_metrics(&self, host_id: &HostId) -> Option<HostMetrics>;
    fn vm_metrics(&self, vm_id: &VmId) -> Option<VmMetrics>;
}

/// Number of worker threads used for the metric-collection phase, capped so that a
/// large cluster doesn't spawn one thread per entity.
const MAX_COLLECTION_WORKERS: usize = 16;

fn worker_count(entity_count: usize) -> usize {
    entity_count.clamp(1, MAX_COLLECTION_WORKERS)
}

/// Fetches host metrics for every id in `host_ids` concurrently against a bounded
/// worker pool, degrading to `None` (so the caller can substitute zero and log a
/// warning) for any id whose fetch does not complete before `deadline`.
///
/// Returns results in the same order as `host_ids`, regardless of completion order.
pub fn collect_host_metrics(
    source: Arc<dyn MetricsSource>,
    host_ids: &[HostId],
    deadline: Instant,
) -> Vec<Option<HostMetrics>> {
    collect(host_ids, deadline, move |id| source.host_metrics(id))
}

/// Same as [`collect_host_metrics`] but for VMs.
pub fn collect_vm_metrics(
    source: Arc<dyn MetricsSource>,
    vm_ids: &[VmId],
    deadline: Instant,
) -> Vec<Option<VmMetrics>> {
    collect(vm_ids, deadline, move |id| source.vm_metrics(id))
}

/// Generic fan-out/fan-in collection helper shared by host and VM metric fetches.
fn collect<Id, Out, F>(ids: &[Id], deadline: Instant, fetch: F) -> Vec<Option<Out>>
where
    Id: Clone + Send + Sync + 'static,
    Out: Send + 'static,
    F: Fn(&Id) -> Option<Out> + Send + Sync + 'static,
{
    let pool = ThreadPool::new(worker_count(ids.len()));
    let fetch = Arc::new(fetch);
    let (tx, rx) = mpsc::channel();

    for (index, id) in ids.iter().cloned().enumerate() {
        let tx = tx.clone();
        let fetch = fetch.clone();
        let remaining = deadline.saturating_duration_since(Instant::now());
        pool.execute(move || {
            let result = run_with_timeout(remaining, move || fetch(&id));
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let mut results: Vec<Option<Out>> = (0..ids.len()).map(|_| None).collect();
    for (index, value) in rx {
        results[index] = value;
    }
    results
}

/// Races `work` against `budget` on a helper thread, substituting `None` on expiry
/// rather than failing the whole collection phase (per-entity timeouts degrade).
fn run_with_timeout<R, W>(budget: Duration, work: W) -> Option<R>
where
    R: Send + 'static,
    W: FnOnce() -> Option<R> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(work());
    });
    rx.recv_timeout(budget).ok().flatten()
}
