//! Evaluation harness: run every task, score every transcript.
//!
//! Tasks run on a bounded tokio worker pool. Results are collected by
//! submission index, so the output order always follows the input task
//! order regardless of which worker finishes first. Dropping the
//! `evaluate` future cancels every in-flight task.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{instrument, warn};

use crate::domain::{Action, EvalError, EvalResult, EvalTask, Result, Transcript};
use crate::evals::{check_eval_uniqueness, CompositeEval, Eval};
use crate::executor::TaskExecutor;
use crate::metrics::EvaluationMetrics;
use crate::obs;

/// Default worker-pool size.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// What the harness does when an executor fails for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFailurePolicy {
    /// Cancel the outstanding tasks and return the error.
    #[default]
    Abort,
    /// Record a failed result per evaluator and keep going.
    RecordFailure,
}

/// Harness settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub num_workers: usize,
    /// Default for the `aggregate` argument of
    /// [`EvaluationHarness::evaluate`]. The harness itself does not keep
    /// it; config-driven callers pass it through on each call.
    pub aggregate: bool,
    pub failure_policy: TaskFailurePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_MAX_WORKERS,
            aggregate: true,
            failure_policy: TaskFailurePolicy::Abort,
        }
    }
}

impl HarnessConfig {
    /// Defaults, with the worker count taken from `AUTOMATA_MAX_WORKERS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("AUTOMATA_MAX_WORKERS") {
            config.num_workers = raw.trim().parse().map_err(|_| {
                EvalError::Config(format!("AUTOMATA_MAX_WORKERS must be an integer, got {raw:?}"))
            })?;
        }
        Ok(config)
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_aggregate(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_failure_policy(mut self, policy: TaskFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Runs a batch of tasks and scores each transcript with every evaluator.
pub struct EvaluationHarness {
    evals: Arc<Vec<Arc<dyn Eval>>>,
    num_workers: usize,
    failure_policy: TaskFailurePolicy,
}

impl std::fmt::Debug for EvaluationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<String> = self.evals.iter().map(|e| e.kind().to_string()).collect();
        f.debug_struct("EvaluationHarness")
            .field("evals", &kinds)
            .field("num_workers", &self.num_workers)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl EvaluationHarness {
    /// Fails with [`EvalError::Config`] on duplicate evaluator kinds or a
    /// zero-sized worker pool.
    pub fn new(evals: Vec<Arc<dyn Eval>>, num_workers: usize) -> Result<Self> {
        check_eval_uniqueness(&evals)?;
        if num_workers == 0 {
            return Err(EvalError::Config("num_workers must be at least 1".into()));
        }
        Ok(Self {
            evals: Arc::new(evals),
            num_workers,
            failure_policy: TaskFailurePolicy::default(),
        })
    }

    /// Build from `config`. `config.aggregate` is not stored; pass it to
    /// [`evaluate`](Self::evaluate).
    pub fn from_config(evals: Vec<Arc<dyn Eval>>, config: &HarnessConfig) -> Result<Self> {
        Ok(Self::new(evals, config.num_workers)?.with_failure_policy(config.failure_policy))
    }

    pub fn with_failure_policy(mut self, policy: TaskFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn evals(&self) -> &[Arc<dyn Eval>] {
        &self.evals
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Execute each task and score it against the shared `expected` actions.
    ///
    /// With `aggregate`, each task contributes one composite result;
    /// otherwise it contributes one result per evaluator, in evaluator order.
    #[instrument(skip_all, fields(tasks = tasks.len(), aggregate = aggregate, workers = self.num_workers))]
    pub async fn evaluate<E>(
        &self,
        tasks: &[EvalTask],
        expected: &[Action],
        executor: Arc<E>,
        aggregate: bool,
    ) -> Result<EvaluationMetrics>
    where
        E: TaskExecutor + ?Sized + 'static,
    {
        obs::emit_eval_started(tasks.len(), self.evals.len(), self.num_workers);

        let expected: Arc<[Action]> = Arc::from(expected);
        // Semaphore bounds concurrency to num_workers
        let sem = Arc::new(tokio::sync::Semaphore::new(self.num_workers));
        // Dropping the set aborts every task still running
        let mut join_set = JoinSet::new();
        let mut index_of = HashMap::with_capacity(tasks.len());

        for (idx, task) in tasks.iter().cloned().enumerate() {
            let sem = Arc::clone(&sem);
            let executor = Arc::clone(&executor);
            let evals = Arc::clone(&self.evals);
            let expected = Arc::clone(&expected);

            let handle = join_set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let outcome = match executor.execute(&task).await {
                    Ok(transcript) => Ok(score_transcript(&evals, &expected, &transcript, aggregate)),
                    Err(source) => Err(EvalError::Executor {
                        task_id: task.task_id.clone(),
                        source,
                    }),
                };
                (idx, outcome)
            });
            index_of.insert(handle.id(), idx);
        }

        // Completed outcomes wait in their submission slot until every
        // earlier task has been collected.
        let mut slots: Vec<Option<Result<Vec<EvalResult>>>> =
            std::iter::repeat_with(|| None).take(tasks.len()).collect();
        let mut results = Vec::new();
        let mut next = 0;

        while next < tasks.len() {
            if let Some(outcome) = slots[next].take() {
                let task_id = &tasks[next].task_id;
                match outcome {
                    Ok(task_results) => {
                        let success = task_results.iter().all(|r| r.success);
                        obs::emit_task_evaluated(task_id, task_results.len(), success);
                        results.extend(task_results);
                    }
                    Err(err) => {
                        obs::emit_task_failed(task_id, &err);
                        match self.failure_policy {
                            TaskFailurePolicy::Abort => {
                                join_set.abort_all();
                                return Err(err);
                            }
                            TaskFailurePolicy::RecordFailure => {
                                warn!(task_id = %task_id, "recording failed task");
                                results.extend(self.failure_results(&err, aggregate));
                            }
                        }
                    }
                }
                next += 1;
                continue;
            }

            match join_set.join_next().await {
                Some(Ok((idx, outcome))) => slots[idx] = Some(outcome),
                Some(Err(join_err)) => {
                    let idx = index_of.get(&join_err.id()).copied().unwrap_or(next);
                    slots[idx] = Some(Err(EvalError::TaskAborted {
                        task_id: tasks[idx].task_id.clone(),
                        reason: join_err.to_string(),
                    }));
                }
                None => {
                    return Err(EvalError::TaskAborted {
                        task_id: tasks[next].task_id.clone(),
                        reason: "task finished without reporting an outcome".into(),
                    })
                }
            }
        }

        let metrics = EvaluationMetrics::new(results);
        obs::emit_eval_finished(metrics.total(), metrics.passed(), metrics.pass_rate());
        Ok(metrics)
    }

    fn failure_results(&self, err: &EvalError, aggregate: bool) -> Vec<EvalResult> {
        let message = err.to_string();
        let per_eval: Vec<EvalResult> = self
            .evals
            .iter()
            .map(|e| EvalResult::execution_failure(e.kind(), &message))
            .collect();
        if aggregate {
            vec![CompositeEval::aggregate_result(&per_eval)]
        } else {
            per_eval
        }
    }
}

fn score_transcript(
    evals: &[Arc<dyn Eval>],
    expected: &[Action],
    transcript: &Transcript,
    aggregate: bool,
) -> Vec<EvalResult> {
    let per_eval: Vec<EvalResult> = evals
        .iter()
        .map(|e| {
            e.process_result(expected, &transcript.messages)
                .with_session(transcript.session_id.clone())
        })
        .collect();
    if aggregate {
        vec![CompositeEval::aggregate_result(&per_eval)]
    } else {
        per_eval
    }
}
