//! Error taxonomy for the evaluation harness.

use std::path::PathBuf;

use automata_state::{CodecError, StorageError};

/// Boxed error returned by task executors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Evaluation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Invalid harness or evaluator configuration, raised before any task runs.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("executor failed on task {task_id}: {source}")]
    Executor {
        task_id: String,
        #[source]
        source: BoxError,
    },

    #[error("task {task_id} did not complete: {reason}")]
    TaskAborted { task_id: String, reason: String },

    /// Store failures surface unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("failed to parse tasks from {}: {source}", path.display())]
    TaskLoad {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_is_transparent() {
        let err = EvalError::from(StorageError::Backend("Database error".to_string()));
        assert_eq!(
            err.to_string(),
            StorageError::Backend("Database error".to_string()).to_string()
        );
    }

    #[test]
    fn test_executor_error_names_task() {
        let err = EvalError::Executor {
            task_id: "task-7".to_string(),
            source: "agent crashed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("task-7"));
        assert!(msg.contains("agent crashed"));
    }

    #[test]
    fn test_task_load_error_names_file() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = EvalError::TaskLoad {
            path: PathBuf::from("tasks.json"),
            source,
        };
        assert!(err.to_string().contains("tasks.json"));
    }
}
