//! Structured observability hooks for evaluation batches.
//!
//! This module provides:
//! - Batch-scoped tracing spans via `EvalSpan` RAII guard
//! - Emission functions for key lifecycle events: start, per-task outcome, finish, persistence
//!
//! Events are emitted at `info!` level (`warn!` for task failures) and can be
//! filtered with `RUST_LOG`.

use tracing::info;

/// RAII guard that enters a span for the duration of an evaluation batch.
///
/// # Example
///
/// ```ignore
/// let _span = EvalSpan::enter("run-12345");
/// // Now all tracing calls are automatically associated with run_id = "run-12345"
/// ```
pub struct EvalSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvalSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: eval_span(run_id).entered(),
        }
    }
}

/// Span tagged with the run_id, for instrumenting async work.
///
/// `EvalSpan` must not be held across `.await`; attach this span with
/// `tracing::Instrument` instead.
pub fn eval_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("automata.eval", run_id = %run_id)
}

/// Emit event: batch started.
pub fn emit_eval_started(tasks: usize, evaluators: usize, workers: usize) {
    info!(
        event = "eval.started",
        tasks = tasks,
        evaluators = evaluators,
        workers = workers,
    );
}

/// Emit event: one task scored.
pub fn emit_task_evaluated(task_id: &str, results: usize, success: bool) {
    info!(event = "eval.task_evaluated", task_id = %task_id, results = results, success = success);
}

/// Emit event: a task's executor failed (warning level).
pub fn emit_task_failed(task_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "eval.task_failed", task_id = %task_id, error = %error);
}

/// Emit event: batch finished with result count and pass rate.
pub fn emit_eval_finished(total: usize, passed: usize, pass_rate: f64) {
    info!(
        event = "eval.finished",
        total = total,
        passed = passed,
        pass_rate = pass_rate,
    );
}

/// Emit event: a result row was persisted.
pub fn emit_result_written(session_id: &str, run_id: Option<&str>, kind: &str, success: bool) {
    info!(
        event = "store.result_written",
        session_id = %session_id,
        run_id = run_id.unwrap_or("-"),
        kind = %kind,
        success = success,
    );
}
