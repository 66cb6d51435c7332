use super::fmt_bytes;
use crate::registry::{Probe, ProbeOutput, Section};
use anyhow::Result;
use async_trait::async_trait;
use sysinfo::{Disks, System};

pub struct CpuProbe;

#[async_trait]
impl Probe for CpuProbe {
    fn name(&self) -> &str {
        "get_cpu_info"
    }

    fn description(&self) -> &str {
        "Get CPU information including number of cores and load average"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let mut sys = System::new();
        sys.refresh_cpu();

        let logical = sys.cpus().len();
        let physical = sys
            .physical_core_count()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let brand = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let load = System::load_average();

        Ok(ProbeOutput::Multiple(vec![
            Section::new(
                "CPU Cores",
                format!("{} logical / {} physical ({})", logical, physical, brand),
            ),
            Section::new(
                "CPU Load Average",
                format!("{:.2} {:.2} {:.2} (1/5/15 min)", load.one, load.five, load.fifteen),
            ),
        ]))
    }
}

pub struct MemoryProbe;

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &str {
        "get_memory_info"
    }

    fn description(&self) -> &str {
        "Get RAM memory usage, swap usage, and available memory in MB/GB. \
         Call this for RAM, memory, or swap questions."
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let mut sys = System::new();
        sys.refresh_memory();

        let content = format!(
            "total: {}\nused: {}\navailable: {}\nswap: {} used of {}",
            fmt_bytes(sys.total_memory()),
            fmt_bytes(sys.used_memory()),
            fmt_bytes(sys.available_memory()),
            fmt_bytes(sys.used_swap()),
            fmt_bytes(sys.total_swap()),
        );

        Ok(ProbeOutput::single("Memory Usage", content))
    }
}

pub struct DiskProbe;

#[async_trait]
impl Probe for DiskProbe {
    fn name(&self) -> &str {
        "get_disk_info"
    }

    fn description(&self) -> &str {
        "Get disk usage information"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let disks = Disks::new_with_refreshed_list();

        let mut lines = Vec::new();
        for disk in disks.list() {
            let total = disk.total_space();
            let free = disk.available_space();
            lines.push(format!(
                "{} ({}): {} free of {}",
                disk.mount_point().display(),
                disk.file_system().to_string_lossy(),
                fmt_bytes(free),
                fmt_bytes(total),
            ));
        }

        if lines.is_empty() {
            lines.push("no disks reported".to_string());
        }

        Ok(ProbeOutput::single("Disk Usage", lines.join("\n")))
    }
}
