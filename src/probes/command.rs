use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// Runs a shell command with a hard timeout and returns its output as
/// display text. Failures and timeouts are folded into the returned string
/// so a stuck or broken utility can never hang or crash a diagnosis turn.
pub async fn run_command(cmd: &str, timeout: Duration) -> String {
    let output = if cfg!(target_os = "windows") {
        Command::new("powershell").args(["-Command", cmd]).output()
    } else {
        Command::new("sh").args(["-c", cmd]).output()
    };

    match tokio::time::timeout(timeout, output).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                format!("Error: {}", stderr)
            }
        }
        Ok(Err(e)) => format!("Error: {}", e),
        Err(_) => {
            warn!(command = cmd, "probe command timed out");
            "Error: command timed out".to_string()
        }
    }
}
