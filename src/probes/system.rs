use super::fmt_bytes;
use crate::registry::{Probe, ProbeOutput, Section};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use sysinfo::{ProcessRefreshKind, RefreshKind, System};

pub struct UptimeProbe;

#[async_trait]
impl Probe for UptimeProbe {
    fn name(&self) -> &str {
        "get_uptime_info"
    }

    fn description(&self) -> &str {
        "Get the system uptime information"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let uptime = System::uptime();
        let booted = Local
            .timestamp_opt(System::boot_time() as i64, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let content = format!("up {} (booted {})", fmt_duration(uptime), booted);
        Ok(ProbeOutput::single("System Uptime", content))
    }
}

pub struct SystemProbe;

#[async_trait]
impl Probe for SystemProbe {
    fn name(&self) -> &str {
        "get_system_info"
    }

    fn description(&self) -> &str {
        "Get kernel version and OS distribution name only. Do NOT call for \
         RAM/memory questions - use get_memory_info instead."
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let kernel = format!(
            "{} {}",
            System::name().unwrap_or_else(|| "unknown".to_string()),
            System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
        );
        let os = System::long_os_version().unwrap_or_else(|| "unknown".to_string());

        Ok(ProbeOutput::Multiple(vec![
            Section::new("Kernel Information", kernel),
            Section::new("OS Information", os),
        ]))
    }
}

pub struct ProcessProbe;

#[async_trait]
impl Probe for ProcessProbe {
    fn name(&self) -> &str {
        "get_process_info"
    }

    fn description(&self) -> &str {
        "Get process information including top CPU and memory consuming processes"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let sys = System::new_with_specifics(
            RefreshKind::new().with_processes(ProcessRefreshKind::everything()),
        );

        let mut by_cpu: Vec<_> = sys.processes().values().collect();
        by_cpu.sort_by(|a, b| {
            b.cpu_usage()
                .partial_cmp(&a.cpu_usage())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top_cpu = by_cpu
            .iter()
            .take(5)
            .map(|p| format!("{} (pid {}): {:.1}% cpu", p.name(), p.pid(), p.cpu_usage()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut by_mem: Vec<_> = sys.processes().values().collect();
        by_mem.sort_by(|a, b| b.memory().cmp(&a.memory()));
        let top_mem = by_mem
            .iter()
            .take(5)
            .map(|p| format!("{} (pid {}): {}", p.name(), p.pid(), fmt_bytes(p.memory())))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ProbeOutput::Multiple(vec![
            Section::new("Total Processes", sys.processes().len().to_string()),
            Section::new("Top CPU Consuming Processes", top_cpu),
            Section::new("Top Memory Consuming Processes", top_mem),
        ]))
    }
}

fn fmt_duration(mut seconds: u64) -> String {
    let days = seconds / 86_400;
    seconds %= 86_400;
    let hours = seconds / 3_600;
    seconds %= 3_600;
    let minutes = seconds / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} day{}", days, if days == 1 { "" } else { "s" }));
    }
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, if hours == 1 { "" } else { "s" }));
    }
    parts.push(format!(
        "{} minute{}",
        minutes,
        if minutes == 1 { "" } else { "s" }
    ));
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(fmt_duration(59), "0 minutes");
        assert_eq!(fmt_duration(60), "1 minute");
        assert_eq!(fmt_duration(3_660), "1 hour, 1 minute");
        assert_eq!(fmt_duration(90_000), "1 day, 1 hour, 0 minutes");
    }
}
