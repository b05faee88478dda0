//! Automata-Eval: evaluation harness for LLM agents
//!
//! Runs a batch of tasks through an executor, scores each resulting
//! transcript against a list of expected actions with one or more
//! evaluators, and summarizes the outcome.
//!
//! ## Key Components
//!
//! - `Eval` and the built-in evaluators (function call, argument subset,
//!   tool sequence, code block), plus `CompositeEval` aggregation
//! - `EvaluationHarness`: bounded, order-preserving task execution
//! - `EvaluationMetrics`: pass rates and action statistics
//! - `EvalResultWriter`: persistence through `automata_state::ResultStore`
//! - `reporting`: JSON and markdown report artifacts

pub mod domain;
pub mod evals;
pub mod executor;
pub mod harness;
pub mod loader;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod telemetry;
pub mod writer;

pub use domain::{
    Action, BoxError, EvalError, EvalKind, EvalResult, EvalTask, FunctionCall, Message, Result,
    Role, Transcript,
};
pub use evals::{
    builtin_evals, check_eval_uniqueness, ArgumentSubsetEval, CodeBlockEval, CompositeEval, Eval,
    FunctionCallEval, MatchOutcome, ToolSequenceEval,
};
pub use executor::{ReplayExecutor, TaskExecutor};
pub use harness::{EvaluationHarness, HarnessConfig, TaskFailurePolicy, DEFAULT_MAX_WORKERS};
pub use loader::{load_expected_actions, EvalTaskLoader};
pub use metrics::{EvaluationMetrics, MetricsSummary};
pub use obs::EvalSpan;
pub use reporting::{render_metrics_md, write_metrics_json, EvalReportArtifact};
pub use telemetry::init_tracing;
pub use writer::EvalResultWriter;

/// Automata-Eval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
