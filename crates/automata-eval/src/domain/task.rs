//! Task descriptors fed to the harness.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// One unit of work for an executor.
///
/// Unknown fields in a task file are kept in `extra` so executors can read
/// descriptor fields this crate does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalTask {
    pub task_id: String,
    #[serde(default)]
    pub instructions: String,
    /// Pre-recorded transcript, used by replaying executors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<Message>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EvalTask {
    pub fn new(task_id: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            instructions: instructions.into(),
            transcript: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_transcript(mut self, messages: Vec<Message>) -> Self {
        self.transcript = Some(messages);
        self
    }
}
