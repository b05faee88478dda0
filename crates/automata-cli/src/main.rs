//! Automata Eval CLI
//!
//! The `automata-eval` command scores recorded agent sessions and manages
//! the persisted results.
//!
//! ## Commands
//!
//! - `run`: Evaluate a task file against expected actions and store the results
//! - `results`: Print stored results for a session

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Instrument, Level};

use automata_eval::obs::eval_span;
use automata_eval::{
    builtin_evals, load_expected_actions, render_metrics_md, write_metrics_json, EvalReportArtifact,
    EvalResultWriter, EvalSpan, EvalTaskLoader, EvaluationHarness, EvaluationMetrics,
    HarnessConfig, ReplayExecutor, TaskFailurePolicy,
};
use automata_state::{Payload, StoreConfig, SurrealResultStore};

#[derive(Parser)]
#[command(name = "automata-eval")]
#[command(author = "Automata Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluation harness for LLM agents", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score recorded transcripts and persist the results
    Run(RunArgs),

    /// Print stored results as JSON
    Results {
        /// Session to read
        #[arg(short, long, env = "AUTOMATA_SESSION_ID")]
        session: String,

        /// Restrict to one run
        #[arg(short, long)]
        run_id: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Task file (JSON array of tasks with recorded transcripts)
    #[arg(short, long)]
    tasks: PathBuf,

    /// Expected actions file (JSON array)
    #[arg(short, long)]
    expected: PathBuf,

    /// Session to store results under when a transcript carries none
    #[arg(short, long, env = "AUTOMATA_SESSION_ID")]
    session: Option<String>,

    /// Run identifier (generated if omitted)
    #[arg(long)]
    run_id: Option<String>,

    /// Worker pool size (overrides AUTOMATA_MAX_WORKERS)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep one result per evaluator instead of one composite per task
    #[arg(long)]
    no_aggregate: bool,

    /// Record failed tasks instead of aborting the batch
    #[arg(long)]
    continue_on_error: bool,

    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    automata_eval::init_tracing(cli.json, level);

    // Initialize database connection
    let store = SurrealResultStore::connect(&StoreConfig::from_env())
        .await
        .context("Failed to connect to evaluation database")?;
    let writer = EvalResultWriter::new(Arc::new(store));

    match cli.command {
        Commands::Run(args) => cmd_run(&writer, &args).await.map(|_| ()),
        Commands::Results { session, run_id } => {
            cmd_results(&writer, &session, run_id.as_deref()).await
        }
    }
}

fn harness_config(args: &RunArgs) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::from_env().context("Invalid harness configuration")?;
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if args.no_aggregate {
        config = config.with_aggregate(false);
    }
    if args.continue_on_error {
        config = config.with_failure_policy(TaskFailurePolicy::RecordFailure);
    }
    Ok(config)
}

/// Evaluate a task file and persist every result
async fn cmd_run(writer: &EvalResultWriter, args: &RunArgs) -> Result<EvaluationMetrics> {
    let config = harness_config(args)?;
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(EvalResultWriter::new_run_id);
    let tasks = EvalTaskLoader::new(&args.tasks)
        .load_tasks()
        .context(format!("Failed to load tasks: {:?}", args.tasks))?;
    let expected = load_expected_actions(&args.expected)
        .context(format!("Failed to load expected actions: {:?}", args.expected))?;
    info!(
        "Evaluating {} tasks against {} expected actions",
        tasks.len(),
        expected.len()
    );

    let harness = EvaluationHarness::from_config(builtin_evals()?, &config)?;
    let metrics = harness
        .evaluate(&tasks, &expected, Arc::new(ReplayExecutor), config.aggregate)
        .instrument(eval_span(&run_id))
        .await
        .context("Evaluation failed")?;

    // Resolve every destination session before writing anything
    let mut sessions = Vec::with_capacity(metrics.total());
    for (i, result) in metrics.results().iter().enumerate() {
        match result.session_id.as_deref().or(args.session.as_deref()) {
            Some(session) => {
                EvalResultWriter::check_session(session)
                    .context(format!("Result {} has an invalid session", i))?;
                sessions.push(session.to_string());
            }
            None => bail!("Result {} has no session; pass --session", i),
        }
    }
    for (session, result) in sessions.iter().zip(metrics.results()) {
        writer
            .write_result(session, result, Some(&run_id))
            .await
            .context("Failed to store result")?;
    }

    let artifact = {
        let _span = EvalSpan::enter(&run_id);
        let artifact =
            EvalReportArtifact::from_metrics(&metrics, args.session.as_deref(), Some(&run_id))?;
        if let Some(path) = &args.report {
            write_metrics_json(path, &artifact)?;
            info!("Report written to {:?}", path);
        }
        artifact
    };

    println!("{}", render_metrics_md(&artifact));
    println!("Stored {} results under run {}", metrics.total(), run_id);

    Ok(metrics)
}

#[derive(Serialize)]
struct StoredResultView {
    kind: String,
    success: bool,
    session_id: Option<String>,
    data: serde_json::Value,
}

/// Print stored results for a session
async fn cmd_results(writer: &EvalResultWriter, session: &str, run_id: Option<&str>) -> Result<()> {
    let results = writer
        .get_results(session, run_id)
        .await
        .context(format!("Failed to read results for session {}", session))?;

    if results.is_empty() {
        println!("No results found for session '{}'", session);
        return Ok(());
    }

    let view: Vec<StoredResultView> = results
        .into_iter()
        .map(|r| StoredResultView {
            kind: r.kind.to_string(),
            success: r.success,
            session_id: r.session_id,
            data: Payload::Map(r.data).to_json(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
