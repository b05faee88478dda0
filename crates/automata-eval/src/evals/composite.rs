//! Aggregation of per-evaluator results for one task.

use automata_state::Payload;

use crate::domain::{EvalKind, EvalResult};

/// Combines the results of several evaluators for the same task.
pub struct CompositeEval;

impl CompositeEval {
    /// Logical AND over `success`; each constituent is kept in `data` under
    /// its evaluator identity. An empty input aggregates to success.
    pub fn aggregate_result(results: &[EvalResult]) -> EvalResult {
        let success = results.iter().all(|r| r.success);
        let session_id = results.iter().find_map(|r| r.session_id.clone());

        let mut aggregated = EvalResult::new(EvalKind::Composite, success).with_session(session_id);
        for (i, result) in results.iter().enumerate() {
            let mut key = result.kind.as_str().to_string();
            if aggregated.data.contains_key(&key) {
                key = format!("{key}#{i}");
            }
            aggregated = aggregated.with_data(key, Payload::Map(result.to_payload()));
        }
        aggregated
    }
}
