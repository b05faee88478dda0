//! Evaluation outcomes and evaluator identities.

use std::fmt;

use automata_state::{Payload, PayloadMap};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::error::{EvalError, Result};

/// Data key holding expected actions that were satisfied.
pub const MATCHED_KEY: &str = "matched";
/// Data key holding expected actions that were not satisfied.
pub const UNMATCHED_KEY: &str = "unmatched";
/// Data key holding observed actions no expectation asked for.
pub const EXTRA_KEY: &str = "extra";
/// Data key holding the error text of a task that failed to execute.
pub const ERROR_KEY: &str = "error";

/// Identity of an evaluator. Two evaluators with the same identity cannot
/// be used in one harness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EvalKind {
    FunctionCall,
    ArgumentSubset,
    ToolSequence,
    CodeBlock,
    Composite,
    Custom(String),
}

impl EvalKind {
    pub fn as_str(&self) -> &str {
        match self {
            EvalKind::FunctionCall => "function_call",
            EvalKind::ArgumentSubset => "argument_subset",
            EvalKind::ToolSequence => "tool_sequence",
            EvalKind::CodeBlock => "code_block",
            EvalKind::Composite => "composite",
            EvalKind::Custom(name) => name,
        }
    }
}

impl From<String> for EvalKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "function_call" => EvalKind::FunctionCall,
            "argument_subset" => EvalKind::ArgumentSubset,
            "tool_sequence" => EvalKind::ToolSequence,
            "code_block" => EvalKind::CodeBlock,
            "composite" => EvalKind::Composite,
            _ => EvalKind::Custom(s),
        }
    }
}

impl From<EvalKind> for String {
    fn from(kind: EvalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EvalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one evaluator (or one aggregation) over one transcript.
///
/// Results are immutable once built: the `with_*` builders consume and
/// return the value.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    pub kind: EvalKind,
    pub success: bool,
    pub session_id: Option<String>,
    pub data: PayloadMap,
}

impl EvalResult {
    pub fn new(kind: EvalKind, success: bool) -> Self {
        Self {
            kind,
            success,
            session_id: None,
            data: PayloadMap::new(),
        }
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Store a list of actions under `key`.
    pub fn with_actions(self, key: &str, actions: &[Action]) -> Self {
        let list: Vec<Payload> = actions.iter().map(Action::to_payload).collect();
        self.with_data(key, list)
    }

    /// Failed result recording why the task never produced a transcript.
    pub fn execution_failure(kind: EvalKind, error: &str) -> Self {
        Self::new(kind, false).with_data(ERROR_KEY, error)
    }

    /// Plain nested-map form, suitable for the payload codec.
    pub fn to_payload(&self) -> PayloadMap {
        let mut map = PayloadMap::new();
        map.insert("kind".into(), Payload::from(self.kind.as_str()));
        map.insert("success".into(), Payload::Bool(self.success));
        map.insert(
            "session_id".into(),
            self.session_id
                .as_deref()
                .map_or(Payload::Null, Payload::from),
        );
        map.insert("data".into(), Payload::Map(self.data.clone()));
        map
    }

    /// Inverse of [`EvalResult::to_payload`].
    pub fn from_payload(map: &PayloadMap) -> Result<Self> {
        let kind = map
            .get("kind")
            .and_then(Payload::as_str)
            .ok_or_else(|| EvalError::Payload("result missing `kind`".into()))?;
        let success = map
            .get("success")
            .and_then(Payload::as_bool)
            .ok_or_else(|| EvalError::Payload("result missing `success`".into()))?;
        let session_id = map
            .get("session_id")
            .and_then(Payload::as_str)
            .map(str::to_string);
        let data = match map.get("data") {
            Some(Payload::Map(data)) => data.clone(),
            Some(other) => {
                return Err(EvalError::Payload(format!(
                    "result `data` is a {}",
                    other.type_name()
                )))
            }
            None => PayloadMap::new(),
        };

        Ok(Self {
            kind: EvalKind::from(kind.to_string()),
            success,
            session_id,
            data,
        })
    }

    /// Decode the action list stored under `key` (empty when absent).
    pub fn actions(&self, key: &str) -> Result<Vec<Action>> {
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(Payload::List(items)) => items.iter().map(Action::from_payload).collect(),
            Some(other) => Err(EvalError::Payload(format!(
                "`{key}` is a {}, expected a list",
                other.type_name()
            ))),
        }
    }

    pub fn matched_actions(&self) -> Result<Vec<Action>> {
        self.actions(MATCHED_KEY)
    }

    pub fn unmatched_actions(&self) -> Result<Vec<Action>> {
        self.actions(UNMATCHED_KEY)
    }

    pub fn extra_actions(&self) -> Result<Vec<Action>> {
        self.actions(EXTRA_KEY)
    }

    /// Nested per-evaluator results of a composite result, in key order.
    pub fn constituents(&self) -> Result<Vec<EvalResult>> {
        if self.kind != EvalKind::Composite {
            return Ok(Vec::new());
        }
        self.data
            .values()
            .filter_map(Payload::as_map)
            .map(EvalResult::from_payload)
            .collect()
    }

    /// `(matched, expected)` action counts, summed over constituents for
    /// composite results.
    pub fn action_counts(&self) -> Result<(usize, usize)> {
        if self.kind == EvalKind::Composite {
            let mut totals = (0, 0);
            for inner in self.constituents()? {
                let (m, e) = inner.action_counts()?;
                totals.0 += m;
                totals.1 += e;
            }
            return Ok(totals);
        }
        let matched = self.matched_actions()?.len();
        let unmatched = self.unmatched_actions()?.len();
        Ok((matched, matched + unmatched))
    }

    /// Observed-but-unexpected actions, flattened through composites.
    pub fn all_extra_actions(&self) -> Result<Vec<Action>> {
        if self.kind == EvalKind::Composite {
            let mut extra = Vec::new();
            for inner in self.constituents()? {
                extra.extend(inner.all_extra_actions()?);
            }
            return Ok(extra);
        }
        self.extra_actions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> EvalResult {
        EvalResult::new(EvalKind::FunctionCall, false)
            .with_session(Some("session-1".to_string()))
            .with_actions(
                MATCHED_KEY,
                &[Action::function_call("search", json!({"query": "rust"}))],
            )
            .with_actions(UNMATCHED_KEY, &[Action::function_call("stop", json!({}))])
            .with_actions(EXTRA_KEY, &[])
            .with_data("note", "partial")
    }

    #[test]
    fn test_payload_round_trip() {
        let result = sample();
        let back = EvalResult::from_payload(&result.to_payload()).expect("from_payload");
        assert_eq!(back, result);
    }

    #[test]
    fn test_payload_round_trip_through_codec() {
        let result = sample();
        let text = automata_state::encode(&result.to_payload()).expect("encode");
        let map = automata_state::decode(&text).expect("decode");
        assert_eq!(map, result.to_payload());
        assert_eq!(EvalResult::from_payload(&map).unwrap(), result);
    }

    #[test]
    fn test_action_counts() {
        assert_eq!(sample().action_counts().unwrap(), (1, 2));
    }

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            EvalKind::FunctionCall,
            EvalKind::ArgumentSubset,
            EvalKind::ToolSequence,
            EvalKind::CodeBlock,
            EvalKind::Composite,
            EvalKind::Custom("latency".to_string()),
        ] {
            assert_eq!(EvalKind::from(kind.to_string()), kind);
        }
    }

    #[test]
    fn test_from_payload_requires_success() {
        let mut map = PayloadMap::new();
        map.insert("kind".into(), Payload::from("function_call"));
        let err = EvalResult::from_payload(&map).unwrap_err();
        assert!(err.to_string().contains("success"));
    }

    #[test]
    fn test_execution_failure_carries_error() {
        let result = EvalResult::execution_failure(EvalKind::ToolSequence, "timeout");
        assert!(!result.success);
        assert_eq!(result.data[ERROR_KEY], Payload::from("timeout"));
        assert_eq!(result.action_counts().unwrap(), (0, 0));
    }
}
