//! Storage trait definitions for evaluation results
//!
//! `ResultStore` is the append-only table abstraction behind the result
//! writer. It is async and backend-agnostic; an in-memory fake is provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// One stored evaluation result row.
///
/// `eval_result` holds the codec-encoded payload text. The store treats it
/// as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub session_id: String,
    pub run_id: Option<String>,
    pub eval_result: String,
}

impl EvalRecord {
    pub fn new(
        session_id: impl Into<String>,
        run_id: Option<String>,
        eval_result: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            run_id,
            eval_result: eval_result.into(),
        }
    }
}

/// Row selection for [`ResultStore::select`].
///
/// `session_id` is always required. When `run_id` is `None`, rows of every
/// run (and rows without a run) for the session are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub session_id: String,
    pub run_id: Option<String>,
}

impl RecordFilter {
    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            run_id: None,
        }
    }

    pub fn with_run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Whether a record satisfies this filter.
    pub fn matches(&self, record: &EvalRecord) -> bool {
        record.session_id == self.session_id
            && match &self.run_id {
                Some(run_id) => record.run_id.as_deref() == Some(run_id.as_str()),
                None => true,
            }
    }
}

/// Append-only evaluation result table.
///
/// Guarantees:
/// - `insert` always adds a new row; existing rows are never updated.
/// - `select` returns matching rows in insertion order.
/// - Backend failures are returned as-is; nothing is retried.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append a row.
    async fn insert(&self, record: EvalRecord) -> StorageResult<()>;

    /// Return all rows matching `filter`, oldest first.
    async fn select(&self, filter: &RecordFilter) -> StorageResult<Vec<EvalRecord>>;
}
