use super::command::run_command;
use crate::registry::{Probe, ProbeOutput, Section};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Reports the current user and active login sessions. Session data is not
/// available through the system-facts crate, so this shells out to the
/// standard utilities under the probe timeout.
pub struct UserProbe {
    timeout: Duration,
}

impl UserProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Probe for UserProbe {
    fn name(&self) -> &str {
        "get_user_info"
    }

    fn description(&self) -> &str {
        "Get user information including current user and logged in users"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        let current = run_command("whoami", self.timeout).await;
        let logged_in = run_command("who", self.timeout).await;
        let logged_in = if logged_in.is_empty() {
            "no active sessions".to_string()
        } else {
            logged_in
        };

        Ok(ProbeOutput::Multiple(vec![
            Section::new("Current User", current),
            Section::new("Logged In Users", logged_in),
        ]))
    }
}
