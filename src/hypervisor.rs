//! Minimal hypervisor control-plane adapter for the CLI binary.
//!
//! The authenticated RPC session and the real inventory/counter queries are explicitly
//! out of scope for this crate (see PURPOSE & SCOPE): a deployment wires its own
//! `InventorySource`/`MetricsSource` against its hypervisor SDK of choice. This adapter
//! performs the one thing that *is* in scope for a runnable binary — a real TCP-level
//! reachability check standing in for the connection lifecycle, so `--dry-run` and the
//! test harness can exercise the CLI's fatal `Connect` path honestly instead of against
//! a fake always-succeeds stub.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use fleet_drs::error::{DrsError, Result};
use fleet_drs::executor::MigrationRpc;
use fleet_drs::inventory::{HostRef, InventorySource, VmRef};
use fleet_drs::metrics::{HostMetrics, MetricsSource, VmMetrics};
use fleet_drs::model::{HostId, MigrationIntent, VmId};

pub struct HypervisorClient {
    endpoint: String,
}

impl HypervisorClient {
    /// Resolves `endpoint` to a socket address and attempts a TCP connection. Does not
    /// perform any hypervisor-specific authentication handshake; `password` is accepted
    /// so callers don't need to special-case this adapter, but is never logged.
    pub fn connect(endpoint: &str, username: &str, _password: &str) -> Result<Self> {
        let addr = endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let candidates = format!("{addr}:443")
            .to_socket_addrs()
            .map_err(|e| DrsError::Connect {
                endpoint: endpoint.to_string(),
                message: format!("could not resolve address: {e}"),
            })?;
        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, Duration::from_secs(5)) {
                Ok(_) => {
                    log::info!("[Hypervisor] connected to {endpoint} as {username}");
                    return Ok(Self { endpoint: endpoint.to_string() });
                }
                Err(e) => last_err = Some(e.to_string()),
            }
        }
        Err(DrsError::Connect {
            endpoint: endpoint.to_string(),
            message: last_err.unwrap_or_else(|| "no reachable address".to_string()),
        })
    }
}

impl InventorySource for HypervisorClient {
    fn active_hosts(&self) -> Result<Vec<HostRef>> {
        // TODO: issue the real inventory query against the hypervisor SDK for `endpoint`.
        log::warn!(
            "[Hypervisor] no inventory integration wired for {}, reporting zero hosts",
            self.endpoint
        );
        Ok(Vec::new())
    }

    fn powered_on_vms(&self) -> Result<Vec<VmRef>> {
        Ok(Vec::new())
    }
}

impl MetricsSource for HypervisorClient {
    fn host_metrics(&self, _host_id: &HostId) -> Option<HostMetrics> {
        None
    }

    fn vm_metrics(&self, _vm_id: &VmId) -> Option<VmMetrics> {
        None
    }
}

impl MigrationRpc for HypervisorClient {
    fn migrate(&self, _intent: &MigrationIntent) -> std::result::Result<(), String> {
        // TODO: issue the real live-migration RPC against the hypervisor SDK.
        Err(format!("no migration RPC wired for {}", self.endpoint))
    }
}
