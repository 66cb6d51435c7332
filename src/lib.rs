//! # sysdiag - LLM-driven system diagnosis assistant
//!
//! Answers natural-language questions about the running machine. A language
//! model picks which diagnostic function to invoke by emitting structured
//! function-call text; this crate parses that text, dispatches to a registry
//! of diagnostic probes, and optionally runs a second model pass that turns
//! the raw data into a friendly summary.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sysdiag::{config::Config, pipeline::DiagnosisPipeline, probes, providers::HttpProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let registry = probes::build_registry(&config.probe);
//!     let selector = Arc::new(HttpProvider::new(config.selector.clone())?);
//!     let summarizer = Arc::new(HttpProvider::new(config.summarizer_endpoint().clone())?);
//!     let mut pipeline = DiagnosisPipeline::new(selector, summarizer, registry, config);
//!
//!     let outcome = pipeline.run_turn("How much memory is free?").await?;
//!     println!("{}", outcome.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod probes;
pub mod providers;
pub mod registry;

// Re-export commonly used types for convenience
pub use config::{Config, EndpointConfig, ProbeConfig};
pub use extract::{IntentExtractor, ParsedCall};
pub use models::{ChatRequest, Message, ModelProvider};
pub use pipeline::{DiagnosisPipeline, TurnOutcome};
pub use registry::{DispatchError, Probe, ProbeOutput, ProbeRegistry, Section};
