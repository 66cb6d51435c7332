use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use sysdiag::config::Config;
use sysdiag::dataset;
use sysdiag::pipeline::{DiagnosisPipeline, TurnOutcome};
use sysdiag::probes;
use sysdiag::providers::HttpProvider;
use sysdiag::ModelProvider;

#[derive(Parser)]
#[command(name = "sysdiag")]
#[command(about = "Ask your machine questions in plain language")]
struct Args {
    #[arg(help = "One-shot question about the system")]
    prompt: Option<String>,

    #[arg(short, long, help = "Run as an interactive chat")]
    interactive: bool,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered diagnostic functions
    Probes,
    /// Generate synthetic training examples for fine-tuning a selector model
    Dataset {
        #[arg(short, long, default_value = "training_data.jsonl")]
        output: PathBuf,
        #[arg(short, long, help = "Cap the number of examples")]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load()?;

    match args.command {
        Some(Commands::Probes) => {
            let registry = probes::build_registry(&config.probe);
            println!("Available diagnostic functions:");
            for (name, description) in registry.descriptions() {
                println!("  {} - {}", name, description);
            }
            return Ok(());
        }
        Some(Commands::Dataset { output, count }) => {
            let mut rng = rand::thread_rng();
            let mut examples = dataset::generate_examples(&mut rng);
            if let Some(count) = count {
                examples.truncate(count);
            }
            let written = dataset::write_jsonl(&output, &examples)?;
            println!("Wrote {} examples to {}", written, output.display());
            return Ok(());
        }
        None => {}
    }

    let mut pipeline = build_pipeline(config)?;

    if let Some(prompt) = args.prompt {
        let outcome = pipeline.run_turn(&prompt).await?;
        display_outcome(&outcome);
        return Ok(());
    }

    if args.interactive {
        run_interactive(&mut pipeline).await?;
        return Ok(());
    }

    println!("Provide a question or run with --interactive. See --help.");
    Ok(())
}

fn build_pipeline(config: Config) -> Result<DiagnosisPipeline> {
    let selector = Arc::new(HttpProvider::new(config.selector.clone())?);
    let summarizer = Arc::new(HttpProvider::new(config.summarizer_endpoint().clone())?);

    // Backend unavailability is the one startup-fatal condition; per-turn
    // failures degrade to displayable text instead.
    if !selector.is_available() {
        bail!(
            "model backend is not available - set SYSDIAG_API_KEY or point \
             selector.base_url at a local server in config.toml"
        );
    }

    let registry = probes::build_registry(&config.probe);
    info!(
        functions = registry.names().count(),
        "diagnosis pipeline ready"
    );
    Ok(DiagnosisPipeline::new(selector, summarizer, registry, config))
}

async fn run_interactive(pipeline: &mut DiagnosisPipeline) -> Result<()> {
    println!("🔧 System Diagnosis Chat");
    println!("Ask about your system. Type 'help' for functions, 'exit' to quit.\n");

    loop {
        print!("👤 You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("👋 Goodbye!");
            break;
        }
        if input.eq_ignore_ascii_case("help") {
            for (name, description) in pipeline.registry().descriptions() {
                println!("  {} - {}", name, description);
            }
            continue;
        }

        match pipeline.run_turn(input).await {
            Ok(outcome) => display_outcome(&outcome),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn display_outcome(outcome: &TurnOutcome) {
    println!("\n💬 {}", outcome.summary);
    for item in &outcome.results {
        println!("\n📋 {}\n{}", item.name, item.result);
    }
    if !outcome.functions_called.is_empty() {
        println!("\n✅ Called: {}", outcome.functions_called.join(", "));
    }
    println!();
}
