use crate::config::EndpointConfig;
use crate::models::{ChatRequest, ModelProvider};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error};

/// OpenAI-compatible chat-completions backend. Works against any server
/// speaking that protocol, a local Ollama instance included.
pub struct HttpProvider {
    config: EndpointConfig,
    client: Client,
}

impl HttpProvider {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ModelProvider for HttpProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();

        debug!(model = %self.config.model, "sending chat-completions request");

        let mut payload = json!({
            "model": self.config.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        if !request.tools.is_empty() {
            payload["tools"] = Value::Array(request.tools.clone());
        }

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.json(&payload).send().await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    let response_json: Value = resp.json().await?;
                    let content = response_json["choices"][0]["message"]["content"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();

                    debug!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "model responded"
                    );
                    Ok(content)
                } else {
                    let error_msg = format!("model API error: {}", resp.status());
                    error!("{}", error_msg);
                    Err(anyhow!(error_msg))
                }
            }
            Err(e) => {
                let error_msg = format!("model request failed: {}", e);
                error!("{}", error_msg);
                Err(anyhow!(error_msg))
            }
        }
    }

    fn name(&self) -> &str {
        &self.config.model
    }

    fn is_available(&self) -> bool {
        // Local endpoints need no key; remote ones do.
        self.config.api_key.is_some() || self.config.base_url.contains("localhost")
            || self.config.base_url.contains("127.0.0.1")
    }
}
