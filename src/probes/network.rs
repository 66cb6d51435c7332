use super::fmt_bytes;
use crate::registry::{Probe, ProbeOutput, Section};
use anyhow::Result;
use async_trait::async_trait;
use sysinfo::{Networks, System};

pub struct NetworkProbe;

#[async_trait]
impl Probe for NetworkProbe {
    fn name(&self) -> &str {
        "get_network_info"
    }

    fn description(&self) -> &str {
        "Get network information including hostname, interfaces, and traffic totals"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let hostname = System::host_name().unwrap_or_else(|| "unknown".to_string());

        let networks = Networks::new_with_refreshed_list();
        let mut lines: Vec<String> = networks
            .iter()
            .map(|(name, data)| {
                format!(
                    "{} ({}): rx {} / tx {}",
                    name,
                    data.mac_address(),
                    fmt_bytes(data.total_received()),
                    fmt_bytes(data.total_transmitted()),
                )
            })
            .collect();
        lines.sort();
        if lines.is_empty() {
            lines.push("no interfaces reported".to_string());
        }

        Ok(ProbeOutput::Multiple(vec![
            Section::new("Hostname", hostname),
            Section::new("Network Interfaces", lines.join("\n")),
        ]))
    }
}
