//! Function-call evaluators.
//!
//! All three extract one `Action::FunctionCall` per assistant message that
//! carries a function call, with string-encoded arguments expanded. They
//! differ only in how an expectation is satisfied:
//!
//! | evaluator            | satisfied when                                        |
//! |----------------------|-------------------------------------------------------|
//! | `FunctionCallEval`   | some observed call is structurally equal (any order)  |
//! | `ArgumentSubsetEval` | same name, expected arguments are a subset (any order)|
//! | `ToolSequenceEval`   | expected calls appear as an ordered subsequence       |

use serde_json::Value;

use super::{match_unordered, Eval, MatchOutcome};
use crate::domain::{Action, EvalKind, Message};

fn extract_function_call(message: &Message) -> Vec<Action> {
    message
        .function_call
        .iter()
        .map(|call| Action::function_call(call.name.clone(), call.parsed_arguments()))
        .collect()
}

fn is_function_call(action: &Action) -> bool {
    matches!(action, Action::FunctionCall { .. })
}

/// Exact structural match, order-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionCallEval;

impl Eval for FunctionCallEval {
    fn kind(&self) -> EvalKind {
        EvalKind::FunctionCall
    }

    fn handles(&self, action: &Action) -> bool {
        is_function_call(action)
    }

    fn extract_actions(&self, message: &Message) -> Vec<Action> {
        extract_function_call(message)
    }

    fn match_actions(&self, expected: &[Action], observed: &[Action]) -> MatchOutcome {
        match_unordered(expected, observed, |want, seen| want == seen)
    }
}

/// Same function name with the expected arguments contained in the
/// observed ones, order-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentSubsetEval;

/// Whether every key of `want` appears in `seen` with a matching value.
/// Nested objects are compared the same way; other values, `null`
/// included, must be equal.
fn is_subset(want: &Value, seen: &Value) -> bool {
    match (want, seen) {
        (Value::Object(w), Value::Object(s)) => w
            .iter()
            .all(|(k, wv)| s.get(k).is_some_and(|sv| is_subset(wv, sv))),
        _ => want == seen,
    }
}

impl Eval for ArgumentSubsetEval {
    fn kind(&self) -> EvalKind {
        EvalKind::ArgumentSubset
    }

    fn handles(&self, action: &Action) -> bool {
        is_function_call(action)
    }

    fn extract_actions(&self, message: &Message) -> Vec<Action> {
        extract_function_call(message)
    }

    fn match_actions(&self, expected: &[Action], observed: &[Action]) -> MatchOutcome {
        match_unordered(expected, observed, |want, seen| match (want, seen) {
            (
                Action::FunctionCall {
                    name: wn,
                    arguments: wa,
                },
                Action::FunctionCall {
                    name: sn,
                    arguments: sa,
                },
            ) => wn == sn && is_subset(wa, sa),
            _ => false,
        })
    }
}

/// Expected calls must occur in order; unrelated calls may be interleaved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolSequenceEval;

impl Eval for ToolSequenceEval {
    fn kind(&self) -> EvalKind {
        EvalKind::ToolSequence
    }

    fn handles(&self, action: &Action) -> bool {
        is_function_call(action)
    }

    fn extract_actions(&self, message: &Message) -> Vec<Action> {
        extract_function_call(message)
    }

    fn match_actions(&self, expected: &[Action], observed: &[Action]) -> MatchOutcome {
        let mut consumed = vec![false; observed.len()];
        let mut cursor = 0;
        let mut outcome = MatchOutcome::default();

        for want in expected {
            match observed[cursor..].iter().position(|seen| seen == want) {
                Some(offset) => {
                    consumed[cursor + offset] = true;
                    cursor += offset + 1;
                    outcome.matched.push(want.clone());
                }
                None => outcome.unmatched.push(want.clone()),
            }
        }

        outcome.extra = observed
            .iter()
            .zip(consumed)
            .filter(|(_, consumed)| !consumed)
            .map(|(a, _)| a.clone())
            .collect();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EXTRA_KEY, MATCHED_KEY};
    use serde_json::json;

    fn call(name: &str, args: Value) -> Action {
        Action::function_call(name, args)
    }

    fn transcript() -> Vec<Message> {
        vec![
            Message::user("look up the docs, then stop"),
            Message::assistant_call("search", json!({"query": "rust", "limit": 5})),
            Message::assistant_call("open", json!("{\"url\": \"https://docs.rs\"}")),
            Message::assistant("done"),
            Message::assistant_call("stop", json!({})),
        ]
    }

    #[test]
    fn test_exact_match_all_present() {
        let expected = vec![
            call("stop", json!({})),
            call("search", json!({"query": "rust", "limit": 5})),
        ];
        let result = FunctionCallEval.process_result(&expected, &transcript());
        assert!(result.success);
        assert_eq!(result.kind, EvalKind::FunctionCall);
        assert_eq!(result.matched_actions().unwrap(), expected);
        assert_eq!(
            result.extra_actions().unwrap(),
            vec![call("open", json!({"url": "https://docs.rs"}))]
        );
    }

    #[test]
    fn test_exact_match_rejects_partial_arguments() {
        let expected = vec![call("search", json!({"query": "rust"}))];
        let result = FunctionCallEval.process_result(&expected, &transcript());
        assert!(!result.success);
        assert_eq!(result.unmatched_actions().unwrap(), expected);
    }

    #[test]
    fn test_exact_match_counts_duplicates() {
        let expected = vec![call("stop", json!({})), call("stop", json!({}))];
        let result = FunctionCallEval.process_result(&expected, &transcript());
        assert!(!result.success);
        assert_eq!(result.action_counts().unwrap(), (1, 2));
    }

    #[test]
    fn test_code_actions_are_ignored() {
        let expected = vec![Action::code_block(None, "fn main")];
        let result = FunctionCallEval.process_result(&expected, &transcript());
        assert!(result.success);
        assert_eq!(result.action_counts().unwrap(), (0, 0));
    }

    #[test]
    fn test_user_messages_are_not_observed() {
        let messages = vec![Message {
            role: crate::domain::Role::User,
            content: None,
            function_call: Some(crate::domain::FunctionCall::new("stop", json!({}))),
        }];
        let result = FunctionCallEval.process_result(&[call("stop", json!({}))], &messages);
        assert!(!result.success);
    }

    #[test]
    fn test_subset_match_accepts_partial_arguments() {
        let expected = vec![
            call("search", json!({"query": "rust"})),
            call("open", json!({})),
        ];
        let result = ArgumentSubsetEval.process_result(&expected, &transcript());
        assert!(result.success);
        assert_eq!(result.extra_actions().unwrap(), vec![call("stop", json!({}))]);
    }

    #[test]
    fn test_subset_match_rejects_wrong_value() {
        let expected = vec![call("search", json!({"query": "go"}))];
        let result = ArgumentSubsetEval.process_result(&expected, &transcript());
        assert!(!result.success);
    }

    #[test]
    fn test_subset_nested_objects() {
        assert!(is_subset(
            &json!({"opts": {"force": true}}),
            &json!({"opts": {"force": true, "dry": false}, "path": "a"})
        ));
        assert!(!is_subset(
            &json!({"opts": {"force": true}}),
            &json!({"opts": {"force": false}})
        ));
        assert!(!is_subset(&json!({"path": "a"}), &json!({})));
    }

    #[test]
    fn test_subset_null_is_a_value_not_a_wildcard() {
        assert!(is_subset(&json!({"cursor": null}), &json!({"cursor": null, "q": "a"})));
        assert!(!is_subset(&json!({"cursor": null}), &json!({"cursor": "abc"})));
        assert!(!is_subset(&json!({"cursor": null}), &json!({})));
    }

    #[test]
    fn test_subset_match_finds_complete_assignment() {
        let messages = vec![
            Message::assistant_call("search", json!({"q": "rust", "limit": 5})),
            Message::assistant_call("search", json!({"q": "rust"})),
        ];
        let expected = vec![
            call("search", json!({"q": "rust"})),
            call("search", json!({"q": "rust", "limit": 5})),
        ];
        let result = ArgumentSubsetEval.process_result(&expected, &messages);
        assert!(result.success);
        assert_eq!(result.action_counts().unwrap(), (2, 2));
        assert!(result.extra_actions().unwrap().is_empty());
    }

    #[test]
    fn test_sequence_in_order() {
        let expected = vec![
            call("search", json!({"query": "rust", "limit": 5})),
            call("stop", json!({})),
        ];
        let result = ToolSequenceEval.process_result(&expected, &transcript());
        assert!(result.success);
        assert_eq!(
            result.extra_actions().unwrap(),
            vec![call("open", json!({"url": "https://docs.rs"}))]
        );
    }

    #[test]
    fn test_sequence_out_of_order_fails() {
        let expected = vec![
            call("stop", json!({})),
            call("search", json!({"query": "rust", "limit": 5})),
        ];
        let result = ToolSequenceEval.process_result(&expected, &transcript());
        assert!(!result.success);
        assert_eq!(result.matched_actions().unwrap(), vec![call("stop", json!({}))]);
        assert_eq!(
            result.unmatched_actions().unwrap(),
            vec![call("search", json!({"query": "rust", "limit": 5}))]
        );
    }

    #[test]
    fn test_result_data_keys() {
        let result = ToolSequenceEval.process_result(&[], &transcript());
        assert!(result.data.contains_key(MATCHED_KEY));
        assert!(result.data.contains_key(EXTRA_KEY));
    }

    #[test]
    fn test_evaluation_is_deterministic_and_pure() {
        let expected = vec![call("search", json!({"query": "rust"}))];
        let messages = transcript();
        let first = ArgumentSubsetEval.process_result(&expected, &messages);
        let second = ArgumentSubsetEval.process_result(&expected, &messages);
        assert_eq!(first, second);
        assert_eq!(messages, transcript());
    }
}
