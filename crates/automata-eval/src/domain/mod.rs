//! Domain models for evaluation.
//!
//! Canonical definitions for the core entities:
//! - `Action`: Expected or observed unit of agent behaviour
//! - `Message` / `Transcript`: Conversation produced by running a task
//! - `EvalTask`: Task descriptor fed to an executor
//! - `EvalResult` / `EvalKind`: Outcome of one evaluator and its identity

pub mod action;
pub mod error;
pub mod message;
pub mod result;
pub mod task;

// Re-export main types and errors
pub use action::Action;
pub use error::{BoxError, EvalError, Result};
pub use message::{FunctionCall, Message, Role, Transcript};
pub use result::{EvalKind, EvalResult, ERROR_KEY, EXTRA_KEY, MATCHED_KEY, UNMATCHED_KEY};
pub use task::EvalTask;
