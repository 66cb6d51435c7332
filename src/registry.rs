use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// One titled block of diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// What a probe hands back: one section, or several in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutput {
    Single(Section),
    Multiple(Vec<Section>),
}

impl ProbeOutput {
    pub fn single(title: impl Into<String>, content: impl Into<String>) -> Self {
        ProbeOutput::Single(Section::new(title, content))
    }
}

/// A zero-argument diagnostic capability reporting one fact about the
/// running machine. Probes are best-effort: they may fail or time out, and
/// the executor absorbs that rather than letting it unwind a turn.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn collect(&self) -> Result<ProbeOutput>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}

/// Immutable-after-build mapping from function name to probe. Iteration
/// order is insertion order, which also fixes the order of the tool
/// manifest sent to the model.
pub struct ProbeRegistry {
    probes: IndexMap<String, Arc<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self {
            probes: IndexMap::new(),
        }
    }

    pub fn register(&mut self, probe: Arc<dyn Probe>) {
        self.probes.insert(probe.name().to_string(), probe);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(|k| k.as_str())
    }

    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.probes
            .values()
            .map(|p| (p.name(), p.description()))
    }

    /// Tool declarations for the selection pass: every registered probe,
    /// all with an empty parameter schema.
    pub fn manifest(&self) -> Vec<Value> {
        self.probes
            .values()
            .map(|probe| {
                json!({
                    "type": "function",
                    "function": {
                        "name": probe.name(),
                        "description": probe.description(),
                        "parameters": {
                            "type": "object",
                            "properties": {},
                            "required": [],
                        },
                    },
                })
            })
            .collect()
    }

    /// Tool declaration for the summarization pass: only the `console`
    /// sink, which takes the message to surface to the user.
    pub fn console_manifest() -> Vec<Value> {
        vec![json!({
            "type": "function",
            "function": {
                "name": "console",
                "description": "Output your analysis to the user. Call this with your response.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Your analysis/response message",
                        },
                    },
                    "required": ["message"],
                },
            },
        })]
    }

    /// Invokes the named probe and renders its output as a flat text blob.
    ///
    /// An unregistered name is an error-kind result and no probe is
    /// invoked. A probe failure is rendered into the result text instead of
    /// propagating, so a broken probe never takes down the caller.
    pub async fn execute(&self, name: &str) -> Result<String, DispatchError> {
        let probe = self
            .probes
            .get(name)
            .ok_or_else(|| DispatchError::UnknownFunction(name.to_string()))?;

        debug!(probe = name, "invoking diagnostic probe");
        match probe.collect().await {
            Ok(output) => Ok(render_output(&output)),
            Err(e) => {
                warn!(probe = name, error = %e, "probe failed");
                Ok(format!("Error executing {}: {}", name, e))
            }
        }
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `Single` renders as `title:\ncontent`; `Multiple` renders each section
/// as its own block separated by blank lines, in source order.
fn render_output(output: &ProbeOutput) -> String {
    match output {
        ProbeOutput::Single(section) => format!("{}:\n{}", section.title, section.content),
        ProbeOutput::Multiple(sections) => sections
            .iter()
            .map(|s| format!("{}:\n{}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
