//! Persistence of evaluation results.
//!
//! `EvalResultWriter` flattens each result into codec text and appends it
//! to a [`ResultStore`]. Reads decode rows back into [`EvalResult`]s in
//! insertion order.

use std::sync::Arc;

use automata_state::{decode, encode, EvalRecord, RecordFilter, ResultStore};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{EvalError, EvalResult, Result};
use crate::metrics::EvaluationMetrics;
use crate::obs;

/// Writes and reads evaluation results through a result store.
#[derive(Clone)]
pub struct EvalResultWriter {
    store: Arc<dyn ResultStore>,
}

fn require_session(session_id: &str) -> Result<&str> {
    if session_id.trim().is_empty() {
        return Err(EvalError::InvalidArgument(
            "session_id must be a non-empty string".into(),
        ));
    }
    Ok(session_id)
}

impl EvalResultWriter {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Fresh identifier for grouping the results of one batch.
    pub fn new_run_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Reject a session id that `write_result` would refuse, without
    /// touching the store.
    pub fn check_session(session_id: &str) -> Result<()> {
        require_session(session_id).map(|_| ())
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    /// Append one result. A blank `session_id` is rejected before anything
    /// reaches the store.
    #[instrument(skip(self, result), fields(kind = %result.kind))]
    pub async fn write_result(
        &self,
        session_id: &str,
        result: &EvalResult,
        run_id: Option<&str>,
    ) -> Result<()> {
        let session_id = require_session(session_id)?;
        let text = encode(&result.to_payload())?;

        self.store
            .insert(EvalRecord::new(
                session_id,
                run_id.map(str::to_string),
                text,
            ))
            .await?;

        obs::emit_result_written(session_id, run_id, result.kind.as_str(), result.success);
        Ok(())
    }

    /// Append every result of `metrics`, in order. Returns the row count.
    pub async fn write_metrics(
        &self,
        session_id: &str,
        metrics: &EvaluationMetrics,
        run_id: Option<&str>,
    ) -> Result<usize> {
        require_session(session_id)?;
        for result in metrics.results() {
            self.write_result(session_id, result, run_id).await?;
        }
        Ok(metrics.total())
    }

    /// Stored results for a session, optionally narrowed to one run.
    #[instrument(skip(self))]
    pub async fn get_results(
        &self,
        session_id: &str,
        run_id: Option<&str>,
    ) -> Result<Vec<EvalResult>> {
        let mut filter = RecordFilter::session(require_session(session_id)?);
        if let Some(run_id) = run_id {
            filter = filter.with_run(run_id);
        }

        let rows = self.store.select(&filter).await?;
        debug!(rows = rows.len(), "loaded stored results");

        rows.iter()
            .map(|row| EvalResult::from_payload(&decode(&row.eval_result)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvalKind;
    use automata_state::fakes::MemoryResultStore;

    #[tokio::test]
    async fn test_blank_session_writes_nothing() {
        let store = Arc::new(MemoryResultStore::new());
        let writer = EvalResultWriter::new(store.clone());

        let result = EvalResult::new(EvalKind::FunctionCall, true);
        let err = writer.write_result("  ", &result, None).await.unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_check_session() {
        assert!(EvalResultWriter::check_session("s-1").is_ok());
        assert!(matches!(
            EvalResultWriter::check_session(" \t"),
            Err(EvalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(EvalResultWriter::new_run_id(), EvalResultWriter::new_run_id());
    }
}
