//! Task executor boundary.
//!
//! The harness depends only on this trait: run one task to completion and
//! hand back the conversation it produced. Agent runtimes implement it
//! outside this crate.

use async_trait::async_trait;

use crate::domain::{BoxError, EvalTask, Message, Transcript};

/// Runs a single task and returns its transcript.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &EvalTask) -> Result<Transcript, BoxError>;
}

/// Executor that replays the transcript recorded in each task.
///
/// A string `session_id` field in the task descriptor is carried over to
/// the transcript. Tasks without a recorded transcript fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayExecutor;

#[async_trait]
impl TaskExecutor for ReplayExecutor {
    async fn execute(&self, task: &EvalTask) -> Result<Transcript, BoxError> {
        let messages: Vec<Message> = task
            .transcript
            .clone()
            .ok_or_else(|| format!("task {} has no recorded transcript", task.task_id))?;

        let mut transcript = Transcript::new(messages);
        if let Some(session) = task.extra.get("session_id").and_then(|v| v.as_str()) {
            transcript = transcript.with_session(session);
        }
        Ok(transcript)
    }
}
