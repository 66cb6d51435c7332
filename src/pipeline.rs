use crate::config::Config;
use crate::extract::IntentExtractor;
use crate::models::{ChatRequest, Message, ModelProvider};
use crate::registry::{DispatchError, ProbeRegistry};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SELECTION_PROMPT: &str = "\
You are a system diagnosis assistant with access to diagnostic functions.

IMPORTANT: Use these functions based on user questions:
- \"RAM\", \"memory\", \"swap\" -> call get_memory_info
- \"OS\", \"kernel\", \"distribution\" -> call get_system_info
- \"CPU\", \"processor\", \"cores\" -> call get_cpu_info
- \"disk\", \"storage\", \"space\" -> call get_disk_info
- \"network\", \"IP\", \"hostname\" -> call get_network_info
- \"processes\", \"running apps\" -> call get_process_info
- \"user\", \"logged in\" -> call get_user_info
- \"uptime\", \"running time\" -> call get_uptime_info

Always call the MOST SPECIFIC function that matches the user's question.";

/// Result of one diagnostic function invocation within a turn.
#[derive(Debug, Clone)]
pub struct FunctionResult {
    pub name: String,
    pub result: String,
}

/// Everything one turn produced, from raw model text to the final
/// user-facing summary.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub raw_response: String,
    pub summary: String,
    pub functions_called: Vec<String>,
    pub results: Vec<FunctionResult>,
}

/// Two-pass diagnosis pipeline: pass one asks the selector model which
/// diagnostic functions to run, pass two asks the summarizer model to turn
/// the collected data into a friendly message delivered via `console`.
///
/// Everything inside a turn runs strictly sequentially; the only
/// cancellation mechanism is the turn-level timeout.
pub struct DiagnosisPipeline {
    selector: Arc<dyn ModelProvider>,
    summarizer: Arc<dyn ModelProvider>,
    registry: ProbeRegistry,
    extractor: IntentExtractor,
    config: Config,
    transcript: Vec<Message>,
}

impl DiagnosisPipeline {
    pub fn new(
        selector: Arc<dyn ModelProvider>,
        summarizer: Arc<dyn ModelProvider>,
        registry: ProbeRegistry,
        config: Config,
    ) -> Self {
        Self {
            selector,
            summarizer,
            registry,
            extractor: IntentExtractor::new(),
            config,
            transcript: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Runs one user turn under the configured turn timeout.
    pub async fn run_turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        let timeout = Duration::from_secs(self.config.turn_timeout_seconds);
        match tokio::time::timeout(timeout, self.process_turn(user_input)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow!(
                "turn timed out after {}s",
                self.config.turn_timeout_seconds
            )),
        }
    }

    async fn process_turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        self.transcript.push(Message::user(user_input));

        // Pass 1: let the selector model pick functions.
        let mut messages = vec![Message::developer(SELECTION_PROMPT)];
        messages.extend(self.transcript.iter().cloned());

        let request = ChatRequest {
            messages,
            tools: self.registry.manifest(),
            max_tokens: self.config.selector.max_tokens,
            temperature: self.config.selector.temperature,
        };
        let response = self.selector.generate(&request).await?;
        debug!(response = %response, "selection pass output");

        let calls = self.extractor.extract(&response);
        self.transcript.push(Message::assistant(response.clone()));

        if calls.is_empty() {
            info!("no diagnostic function identified");
            return Ok(TurnOutcome {
                raw_response: response,
                summary: "I couldn't determine which diagnostic function to call for that. \
                          Try asking about memory, CPU, disk, network, processes, users, or uptime."
                    .to_string(),
                functions_called: Vec::new(),
                results: Vec::new(),
            });
        }

        // Execute in extraction order, one at a time, accumulating text.
        // Unknown names surface in the results instead of aborting the turn.
        let mut results = Vec::new();
        for call in &calls {
            let result = match self.registry.execute(&call.name).await {
                Ok(text) => text,
                Err(DispatchError::UnknownFunction(name)) => {
                    warn!(function = %name, "model requested unregistered function");
                    format!("Error: Unknown function '{}'", name)
                }
            };
            results.push(FunctionResult {
                name: call.name.clone(),
                result,
            });
        }

        let mut blob = String::new();
        for item in &results {
            blob.push_str(&format!("{}: {}\n", item.name, item.result));
        }

        let summary = self.summarize(&blob).await;

        Ok(TurnOutcome {
            raw_response: response,
            summary,
            functions_called: calls.iter().map(|c| c.name.clone()).collect(),
            results,
        })
    }

    /// Pass 2: hand the data blob to the summarizer, which is expected to
    /// answer through the `console` sink. Any failure falls back to the
    /// raw data so the user always sees something grounded in real output.
    async fn summarize(&self, blob: &str) -> String {
        let data = truncate_chars(blob, 800);

        let messages = vec![
            Message::developer(format!(
                "You are a helpful system assistant.\n\
                 Summarize this system data for the user.\n\n\
                 DATA:\n{}\n\n\
                 Call console() with a helpful summary of the above data. \
                 Include the actual numbers and values from the data.",
                data
            )),
            Message::user(format!("Summarize this data: {}", truncate_chars(&data, 200))),
        ];

        let request = ChatRequest {
            messages,
            tools: ProbeRegistry::console_manifest(),
            max_tokens: self.config.summarizer_endpoint().max_tokens,
            temperature: self.config.summarizer_endpoint().temperature,
        };

        match self.summarizer.generate(&request).await {
            Ok(response) => {
                let calls = self.extractor.extract(&response);
                match calls.iter().find(|c| c.name == "console") {
                    Some(call) => match &call.message {
                        Some(message) if !message.is_empty() => message.clone(),
                        _ => fallback_summary(&data),
                    },
                    None => fallback_summary(&data),
                }
            }
            Err(e) => {
                warn!(error = %e, "summarization pass failed");
                fallback_summary(&data)
            }
        }
    }
}

fn fallback_summary(data: &str) -> String {
    format!("Here's the system data:\n{}", truncate_chars(data, 500))
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
