use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sysdiag::config::Config;
use sysdiag::models::{ChatRequest, ModelProvider};
use sysdiag::pipeline::DiagnosisPipeline;
use sysdiag::registry::{Probe, ProbeOutput, ProbeRegistry};
use sysdiag::DispatchError;

/// Replays canned model responses in order, one per inference call.
struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        })
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, _request: &ChatRequest) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted response left"))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct FakeProbe {
    name: &'static str,
    content: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Probe for FakeProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "test probe"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProbeOutput::single("Data", self.content))
    }
}

struct BrokenProbe;

#[async_trait]
impl Probe for BrokenProbe {
    fn name(&self) -> &str {
        "get_disk_info"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn collect(&self) -> Result<ProbeOutput> {
        Err(anyhow!("device unavailable"))
    }
}

fn test_registry(cpu_calls: Arc<AtomicUsize>, mem_calls: Arc<AtomicUsize>) -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry.register(Arc::new(FakeProbe {
        name: "get_cpu_info",
        content: "8 cores, load 0.42",
        calls: cpu_calls,
    }));
    registry.register(Arc::new(FakeProbe {
        name: "get_memory_info",
        content: "7.2 GB used of 16.0 GB",
        calls: mem_calls,
    }));
    registry.register(Arc::new(BrokenProbe));
    registry
}

#[tokio::test]
async fn two_pass_turn_executes_calls_in_order_and_surfaces_console_message() {
    let cpu_calls = Arc::new(AtomicUsize::new(0));
    let mem_calls = Arc::new(AtomicUsize::new(0));

    let provider = ScriptedProvider::new(vec![
        "call:get_cpu_info call:get_memory_info",
        "call:console{message:<escape>CPU and memory both look healthy.<escape>}",
    ]);

    let mut pipeline = DiagnosisPipeline::new(
        provider.clone(),
        provider,
        test_registry(cpu_calls.clone(), mem_calls.clone()),
        Config::default(),
    );

    let outcome = pipeline.run_turn("how is the machine doing?").await.unwrap();

    assert_eq!(
        outcome.functions_called,
        vec!["get_cpu_info", "get_memory_info"]
    );
    assert_eq!(cpu_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mem_calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.summary, "CPU and memory both look healthy.");
    assert!(outcome.results[0].result.contains("8 cores"));
    assert!(outcome.results[1].result.contains("7.2 GB"));
}

#[tokio::test]
async fn no_intent_turn_says_so_plainly() {
    let provider = ScriptedProvider::new(vec!["The machine seems fine, nothing to check."]);

    let mut pipeline = DiagnosisPipeline::new(
        provider.clone(),
        provider,
        test_registry(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))),
        Config::default(),
    );

    let outcome = pipeline.run_turn("hello there").await.unwrap();

    assert!(outcome.functions_called.is_empty());
    assert!(outcome.results.is_empty());
    assert!(outcome
        .summary
        .contains("couldn't determine which diagnostic function"));
}

#[tokio::test]
async fn unknown_function_surfaces_in_results_without_aborting_turn() {
    let cpu_calls = Arc::new(AtomicUsize::new(0));

    let provider = ScriptedProvider::new(vec![
        "call:get_nonexistent_info call:get_cpu_info",
        "call:console{message:<escape>Partial data collected.<escape>}",
    ]);

    let mut pipeline = DiagnosisPipeline::new(
        provider.clone(),
        provider,
        test_registry(cpu_calls.clone(), Arc::new(AtomicUsize::new(0))),
        Config::default(),
    );

    let outcome = pipeline.run_turn("check the frobnicator").await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results[0]
        .result
        .contains("Unknown function 'get_nonexistent_info'"));
    assert_eq!(cpu_calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.summary, "Partial data collected.");
}

#[tokio::test]
async fn failing_probe_reports_its_error_section() {
    let provider = ScriptedProvider::new(vec![
        "call:get_disk_info",
        "no console call here",
    ]);

    let mut pipeline = DiagnosisPipeline::new(
        provider.clone(),
        provider,
        test_registry(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))),
        Config::default(),
    );

    let outcome = pipeline.run_turn("disk please").await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results[0].result.contains("Error executing get_disk_info"));
    assert!(outcome.results[0].result.contains("device unavailable"));
    // Summarizer gave no console call, so the raw data falls through.
    assert!(outcome.summary.starts_with("Here's the system data:"));
    assert!(outcome.summary.contains("get_disk_info"));
}

#[tokio::test]
async fn summarizer_failure_falls_back_to_raw_data() {
    let cpu_calls = Arc::new(AtomicUsize::new(0));

    // Only one scripted response: the summarization call will error out.
    let provider = ScriptedProvider::new(vec!["call:get_cpu_info"]);

    let mut pipeline = DiagnosisPipeline::new(
        provider.clone(),
        provider,
        test_registry(cpu_calls, Arc::new(AtomicUsize::new(0))),
        Config::default(),
    );

    let outcome = pipeline.run_turn("cpu?").await.unwrap();
    assert!(outcome.summary.starts_with("Here's the system data:"));
    assert!(outcome.summary.contains("8 cores"));
}

#[tokio::test]
async fn registry_executes_real_probe_set() {
    // The shipped probes are best-effort; whatever they return must render
    // as non-empty text and never panic or propagate.
    let registry = sysdiag::probes::build_registry(&sysdiag::ProbeConfig::default());

    for name in ["get_memory_info", "get_uptime_info", "get_system_info"] {
        let text = registry.execute(name).await.unwrap();
        assert!(!text.is_empty(), "{} returned empty text", name);
    }

    let err = registry.execute("get_flux_capacitor_info").await.unwrap_err();
    assert!(matches!(err, DispatchError::UnknownFunction(_)));
}
