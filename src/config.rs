use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend for the function-selection pass.
    pub selector: EndpointConfig,
    /// Backend for the summarization pass; falls back to the selector
    /// endpoint when absent.
    pub summarizer: Option<EndpointConfig>,
    pub probe: ProbeConfig,
    /// Caller-level bound on one whole turn, the only cancellation
    /// mechanism there is.
    pub turn_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "functiongemma".to_string(),
            api_key: None,
            max_tokens: 256,
            temperature: 0.7,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Shelled-out probe commands are killed after this many seconds and
    /// report a timed-out result instead of hanging the turn.
    pub command_timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command_timeout_seconds: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try to load from config file, otherwise use defaults
        let config_path = std::env::current_dir()?.join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Self::default()
        };

        // Override API keys from environment variables
        if let Ok(key) = std::env::var("SYSDIAG_API_KEY") {
            config.selector.api_key = Some(key.clone());
            if let Some(summarizer) = &mut config.summarizer {
                summarizer.api_key = Some(key);
            }
        } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.selector.api_key = Some(key.clone());
            if let Some(summarizer) = &mut config.summarizer {
                summarizer.api_key = Some(key);
            }
        }

        Ok(config)
    }

    pub fn summarizer_endpoint(&self) -> &EndpointConfig {
        self.summarizer.as_ref().unwrap_or(&self.selector)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selector: EndpointConfig::default(),
            summarizer: None,
            probe: ProbeConfig::default(),
            turn_timeout_seconds: 120,
        }
    }
}
