use crate::extract::encode_call;
use anyhow::Result;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One synthetic training pair: a user phrasing and the function-call text
/// the model should emit for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: String,
    pub output: String,
}

/// Representative phrasings per diagnostic function, used to manufacture
/// labeled examples for fine-tuning a selector model.
const QUERY_BANK: &[(&str, &[&str])] = &[
    (
        "get_uptime_info",
        &[
            "How long has the system been running?",
            "What is the system uptime?",
            "When was the system started?",
            "Show me uptime info",
            "What's the uptime?",
        ],
    ),
    (
        "get_cpu_info",
        &[
            "How many CPU cores do I have?",
            "What is my CPU load?",
            "Tell me about the processor",
            "What's the CPU status?",
            "CPU cores and load?",
        ],
    ),
    (
        "get_memory_info",
        &[
            "How much memory am I using?",
            "What is my RAM usage?",
            "How much free memory?",
            "Memory and swap information",
            "Swap usage?",
            "How much memory left?",
        ],
    ),
    (
        "get_disk_info",
        &[
            "How much disk space is available?",
            "Check disk usage",
            "How full is the disk?",
            "Free disk space?",
            "Storage capacity?",
        ],
    ),
    (
        "get_network_info",
        &[
            "What is my IP address?",
            "What is the hostname?",
            "Show network information",
            "Check network status",
            "Network configuration?",
        ],
    ),
    (
        "get_system_info",
        &[
            "What OS am I running?",
            "What is the kernel version?",
            "What Linux version?",
            "Distribution info?",
            "What's the OS?",
        ],
    ),
    (
        "get_process_info",
        &[
            "What processes are running?",
            "What is using the most CPU?",
            "What is using the most memory?",
            "Show top processes",
            "List processes?",
        ],
    ),
    (
        "get_user_info",
        &[
            "Who is the current user?",
            "What users are logged in?",
            "Who's on the system?",
            "Current user?",
        ],
    ),
];

/// Queries that should trigger several functions in one response.
const MULTI_QUERY_BANK: &[(&str, &[&str])] = &[
    (
        "Show me full system diagnostics",
        &[
            "get_system_info",
            "get_cpu_info",
            "get_memory_info",
            "get_disk_info",
        ],
    ),
    (
        "Health check - CPU, memory, and disk",
        &["get_cpu_info", "get_memory_info", "get_disk_info"],
    ),
    (
        "Who is logged in and how long has the machine been up?",
        &["get_user_info", "get_uptime_info"],
    ),
];

/// Generates the full example set, shuffled. The expected output is the
/// fully bracketed call form, so a model trained on these emits exactly
/// what the extractor recognizes at highest priority.
pub fn generate_examples(rng: &mut impl rand::Rng) -> Vec<TrainingExample> {
    let mut examples = Vec::new();

    for (func_name, queries) in QUERY_BANK {
        for query in *queries {
            examples.push(TrainingExample {
                input: query.to_string(),
                output: encode_call(func_name),
            });
        }
    }

    for (query, funcs) in MULTI_QUERY_BANK {
        let output = funcs
            .iter()
            .map(|f| encode_call(f))
            .collect::<Vec<_>>()
            .join(" ");
        examples.push(TrainingExample {
            input: query.to_string(),
            output,
        });
    }

    examples.shuffle(rng);
    examples
}

/// Writes examples as newline-delimited JSON with `input`/`output` fields.
pub fn write_jsonl(path: &Path, examples: &[TrainingExample]) -> Result<usize> {
    let mut file = std::fs::File::create(path)?;
    for example in examples {
        serde_json::to_writer(&mut file, example)?;
        file.write_all(b"\n")?;
    }
    info!(count = examples.len(), path = %path.display(), "wrote training examples");
    Ok(examples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::IntentExtractor;

    #[test]
    fn every_example_output_parses_back_to_its_functions() {
        let mut rng = rand::thread_rng();
        let examples = generate_examples(&mut rng);
        assert!(!examples.is_empty());

        let extractor = IntentExtractor::new();
        for example in &examples {
            let calls = extractor.extract(&example.output);
            assert!(
                !calls.is_empty(),
                "output did not round-trip: {}",
                example.output
            );
            for call in calls {
                assert!(call.name.starts_with("get_"), "unexpected name {}", call.name);
            }
        }
    }

    #[test]
    fn jsonl_writer_emits_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.jsonl");

        let examples = vec![
            TrainingExample {
                input: "What is my RAM usage?".to_string(),
                output: encode_call("get_memory_info"),
            },
            TrainingExample {
                input: "Check disk usage".to_string(),
                output: encode_call("get_disk_info"),
            },
        ];
        let written = write_jsonl(&path, &examples).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: TrainingExample = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.input, "What is my RAM usage?");
    }
}
