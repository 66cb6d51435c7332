use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: "developer".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One inference call: an ordered conversation plus the tool manifest the
/// model may call into.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<Value>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Opaque inference backend. Only the decoded text continuation is
/// consumed; everything downstream works from that string.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &ChatRequest) -> Result<String>;
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
}
