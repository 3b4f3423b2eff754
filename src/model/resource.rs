//! The four resource axes load and capacity are tracked on.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Resource {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::Cpu, Resource::Memory, Resource::Disk, Resource::Network];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Cpu => "cpu",
            Resource::Memory => "memory",
            Resource::Disk => "disk",
            Resource::Network => "network",
        };
        f.write_str(s)
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Resource::Cpu),
            "memory" | "mem" => Ok(Resource::Memory),
            "disk" => Ok(Resource::Disk),
            "network" | "net" => Ok(Resource::Network),
            other => Err(format!("unknown resource '{other}', expected one of cpu,memory,disk,network")),
        }
    }
}

/// Parses `--metrics`'s comma-separated list into a deduplicated `Vec<Resource>`.
#[derive(Debug, Clone)]
pub struct ResourceSet(pub Vec<Resource>);

impl FromStr for ResourceSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut resources = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let resource = Resource::from_str(part)?;
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
        if resources.is_empty() {
            return Err("--metrics requires at least one resource".to_string());
        }
        Ok(ResourceSet(resources))
    }
}
