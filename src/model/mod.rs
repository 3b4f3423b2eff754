//! Core data model: identifiers, hosts, VMs, migration intents, and affinity grouping.

pub mod affinity;
pub mod host;
pub mod ids;
pub mod intent;
pub mod resource;
pub mod vm;

pub use host::Host;
pub use ids::{HostId, VmId};
pub use intent::{MigrationIntent, Reason};
pub use resource::{Resource, ResourceSet};
pub use vm::Vm;
