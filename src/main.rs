//! Chunking strategy comparison CLI
//!
//! Benchmarks every registered chunking strategy against one document and a
//! fixed query workload, then prints comparative tables.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the comparison on the embedded sample document
//! ./chunking-benchmark run sk-proj-...
//!
//! # Bring your own document and query workload
//! ./chunking-benchmark run sk-proj-... \
//!     --document ./my-doc.txt \
//!     --queries ./queries.json
//!
//! # List the registered strategies
//! ./chunking-benchmark list
//! ```
//!
//! The credential can also come from `OPENAI_API_KEY`. Without one, nothing
//! runs: the process prints usage to stderr and exits with code 1.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chunking_benchmark::backend::{EmbeddingClient, RemoteBackend};
use chunking_benchmark::config::HarnessConfig;
use chunking_benchmark::document;
use chunking_benchmark::queries::QuerySet;
use chunking_benchmark::report::print_report;
use chunking_benchmark::runner::{run_comparison, BenchmarkRunner};
use chunking_benchmark::strategies::builtin_registry;

#[derive(Parser)]
#[command(name = "chunking-benchmark")]
#[command(about = "Compare chunking strategies on one document with a fixed query workload")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full strategy comparison
    Run {
        /// Embedding service API key; falls back to OPENAI_API_KEY
        api_key: Option<String>,

        /// Document to benchmark (default: embedded sample document)
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Query workload JSON file (default: built-in workload)
        #[arg(short, long)]
        queries: Option<PathBuf>,

        /// Harness config TOML (default: ./benchmark.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Concurrent strategy runs (default from config; 1 = sequential)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-operation timeout in seconds (default from config)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// List the registered strategies
    List,

    /// Validate a query workload file
    ValidateQueries {
        /// Path to the query JSON file
        #[arg(short, long)]
        queries: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            api_key,
            document,
            queries,
            config,
            workers,
            timeout_secs,
        } => {
            run_benchmark(
                api_key,
                document.as_deref(),
                queries.as_deref(),
                config.as_deref(),
                workers,
                timeout_secs,
            )
            .await?;
        }

        Commands::List => {
            list_strategies();
        }

        Commands::ValidateQueries { queries } => {
            validate_queries(&queries)?;
        }
    }

    Ok(())
}

async fn run_benchmark(
    api_key: Option<String>,
    document_path: Option<&Path>,
    queries_path: Option<&Path>,
    config_path: Option<&Path>,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    // Missing credential is the one fatal startup error: nothing runs.
    let api_key = match api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok()) {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("Usage: chunking-benchmark run <API_KEY>");
            eprintln!("An embedding service credential is required, either as the first");
            eprintln!("argument or via the OPENAI_API_KEY environment variable.");
            std::process::exit(1);
        }
    };

    let mut config = match config_path {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::load_default()?,
    };
    if let Some(workers) = workers {
        config.run.workers = workers;
    }
    if let Some(timeout_secs) = timeout_secs {
        config.run.timeout_secs = timeout_secs;
    }

    let workload = match queries_path {
        Some(path) => QuerySet::load(path)?,
        None => QuerySet::default_workload(),
    };
    let doc = document::load_document(document_path)?;

    println!("╔════════════════════════════════════════════════════════════════════════╗");
    println!("║                   CHUNKING STRATEGIES COMPARISON                       ║");
    println!("╚════════════════════════════════════════════════════════════════════════╝\n");

    let stats = document::stats(&doc);
    println!("Test Document Statistics:");
    println!("  Total length: {} characters", stats.chars);
    println!("  Word count: {} words", stats.words);
    println!("  Sentence count: {} sentences", stats.sentences);

    let registry = builtin_registry();
    println!(
        "\nBenchmarking {} strategies against {} queries ('{}' workload)",
        registry.len(),
        workload.queries.len(),
        workload.metadata.name
    );
    if config.run.workers > 1 {
        println!("  Parallelism: up to {} concurrent strategies", config.run.workers);
    }
    println!();

    let backend = Arc::new(RemoteBackend::new(EmbeddingClient::new(
        &config.embedding,
        api_key,
    )));
    let runner = Arc::new(BenchmarkRunner::new(
        backend,
        Duration::from_secs(config.run.timeout_secs),
    ));

    // On interrupt the comparison future is dropped; in-flight index handles
    // release when the runtime shuts their tasks down.
    let report = tokio::select! {
        report = run_comparison(&registry, runner, &doc, &workload.queries, config.run.workers) => report,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, aborting comparison");
            anyhow::bail!("interrupted");
        }
    };

    print_report(&report, &workload.queries);
    println!("\n✅ Comparison complete!");

    Ok(())
}

fn list_strategies() {
    println!("╔════════════════════════════════════════════════════════════════════════╗");
    println!("║                        REGISTERED STRATEGIES                           ║");
    println!("╚════════════════════════════════════════════════════════════════════════╝\n");

    println!("{:<20} {:<12} DESCRIPTION", "NAME", "PRESERVING");
    println!("{}", "─".repeat(72));
    for registered in builtin_registry().entries() {
        println!(
            "{:<20} {:<12} {}",
            registered.name,
            if registered.strategy.content_preserving() {
                "yes"
            } else {
                "no"
            },
            registered.strategy.description()
        );
    }
}

fn validate_queries(path: &Path) -> Result<()> {
    println!("Validating {}...", path.display());

    let workload = QuerySet::load(path)?;

    println!("✓ Valid query file");
    println!("  Name: {}", workload.metadata.name);
    if !workload.metadata.description.is_empty() {
        println!("  Description: {}", workload.metadata.description);
    }
    println!("  Queries: {}", workload.queries.len());
    for (i, query) in workload.queries.iter().enumerate() {
        println!("    {}. {}", i + 1, query);
    }

    Ok(())
}
