pub mod command;
pub mod network;
pub mod resources;
pub mod system;
pub mod users;

use crate::config::ProbeConfig;
use crate::registry::ProbeRegistry;
use std::sync::Arc;
use std::time::Duration;

pub use network::NetworkProbe;
pub use resources::{CpuProbe, DiskProbe, MemoryProbe};
pub use system::{ProcessProbe, SystemProbe, UptimeProbe};
pub use users::UserProbe;

/// Builds the full diagnostic registry. Registration order is the order
/// the functions are declared to the model.
pub fn build_registry(config: &ProbeConfig) -> ProbeRegistry {
    let command_timeout = Duration::from_secs(config.command_timeout_seconds);

    let mut registry = ProbeRegistry::new();
    registry.register(Arc::new(UptimeProbe));
    registry.register(Arc::new(CpuProbe));
    registry.register(Arc::new(MemoryProbe));
    registry.register(Arc::new(DiskProbe));
    registry.register(Arc::new(NetworkProbe));
    registry.register(Arc::new(SystemProbe));
    registry.register(Arc::new(ProcessProbe));
    registry.register(Arc::new(UserProbe::new(command_timeout)));
    registry
}

pub(crate) fn fmt_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
