//! Task and expectation files.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Action, EvalError, EvalTask, Result};

/// Loads a JSON array of task records from disk.
#[derive(Debug, Clone)]
pub struct EvalTaskLoader {
    path: PathBuf,
}

impl EvalTaskLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_tasks(&self) -> Result<Vec<EvalTask>> {
        let tasks: Vec<EvalTask> = read_json(&self.path)?;
        debug!(path = %self.path.display(), tasks = tasks.len(), "loaded tasks");
        Ok(tasks)
    }
}

/// Loads the expected actions shared by every task in a batch.
pub fn load_expected_actions(path: impl AsRef<Path>) -> Result<Vec<Action>> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| EvalError::TaskLoad {
        path: path.to_path_buf(),
        source,
    })
}
