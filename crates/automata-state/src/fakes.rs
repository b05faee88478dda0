//! In-memory fakes for storage traits (testing only)
//!
//! `MemoryResultStore` satisfies the `ResultStore` contract without any
//! external dependencies, and can be told to fail to exercise error paths.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory result table backed by a `Vec<EvalRecord>`.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    rows: Mutex<Vec<EvalRecord>>,
    fail_with: Mutex<Option<String>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StorageError::Backend(message)`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap() = Some(message.into());
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_failure(&self) -> StorageResult<()> {
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(StorageError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn insert(&self, record: EvalRecord) -> StorageResult<()> {
        self.check_failure()?;
        self.rows.lock().unwrap().push(record);
        Ok(())
    }

    async fn select(&self, filter: &RecordFilter) -> StorageResult<Vec<EvalRecord>> {
        self.check_failure()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}
