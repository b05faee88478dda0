//! Code-writing evaluator.
//!
//! Observed actions are the fenced markdown code blocks in assistant
//! content. An expected `Action::CodeBlock` is satisfied by a block whose
//! body contains the expected snippet and, when the expectation names a
//! language, whose fence carries that language tag (case-insensitive).
//! The code is never executed.

use regex::Regex;

use super::{match_unordered, Eval, MatchOutcome};
use crate::domain::{Action, EvalError, EvalKind, Message, Result};

const FENCE_PATTERN: &str = r"(?s)```[ \t]*([A-Za-z0-9_+.#-]*)[^\n]*\n(.*?)```";

#[derive(Debug, Clone)]
pub struct CodeBlockEval {
    fence: Regex,
}

impl CodeBlockEval {
    pub fn new() -> Result<Self> {
        let fence = Regex::new(FENCE_PATTERN)
            .map_err(|e| EvalError::Config(format!("code fence pattern: {e}")))?;
        Ok(Self { fence })
    }

    fn blocks(&self, content: &str) -> Vec<Action> {
        self.fence
            .captures_iter(content)
            .map(|caps| {
                let language = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .filter(|lang| !lang.is_empty());
                let body = caps.get(2).map_or("", |m| m.as_str());
                Action::code_block(language, body)
            })
            .collect()
    }
}

fn block_satisfies(want: &Action, seen: &Action) -> bool {
    match (want, seen) {
        (
            Action::CodeBlock {
                language: want_lang,
                contains: snippet,
            },
            Action::CodeBlock {
                language: seen_lang,
                contains: body,
            },
        ) => {
            let language_ok = match (want_lang, seen_lang) {
                (None, _) => true,
                (Some(w), Some(s)) => w.eq_ignore_ascii_case(s),
                (Some(_), None) => false,
            };
            language_ok && body.contains(snippet.as_str())
        }
        _ => false,
    }
}

impl Eval for CodeBlockEval {
    fn kind(&self) -> EvalKind {
        EvalKind::CodeBlock
    }

    fn handles(&self, action: &Action) -> bool {
        matches!(action, Action::CodeBlock { .. })
    }

    fn extract_actions(&self, message: &Message) -> Vec<Action> {
        message
            .content
            .as_deref()
            .map(|content| self.blocks(content))
            .unwrap_or_default()
    }

    fn match_actions(&self, expected: &[Action], observed: &[Action]) -> MatchOutcome {
        match_unordered(expected, observed, block_satisfies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply() -> Message {
        Message::assistant(
            "Here is the fix:\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\
             and a config:\n```\nretries = 3\n```\n",
        )
    }

    #[test]
    fn test_extracts_fenced_blocks() {
        let eval = CodeBlockEval::new().unwrap();
        let blocks = eval.extract_actions(&reply());
        assert_eq!(
            blocks,
            vec![
                Action::code_block(Some("rust"), "fn main() {\n    println!(\"hi\");\n}\n"),
                Action::code_block(None, "retries = 3\n"),
            ]
        );
    }

    #[test]
    fn test_language_and_snippet_match() {
        let eval = CodeBlockEval::new().unwrap();
        let expected = vec![
            Action::code_block(Some("Rust"), "println!"),
            Action::code_block(None, "retries = 3"),
        ];
        let result = eval.process_result(&expected, &[reply()]);
        assert!(result.success);
        assert!(result.extra_actions().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_language_fails() {
        let eval = CodeBlockEval::new().unwrap();
        let expected = vec![Action::code_block(Some("python"), "println!")];
        let result = eval.process_result(&expected, &[reply()]);
        assert!(!result.success);
        assert_eq!(result.unmatched_actions().unwrap(), expected);
    }

    #[test]
    fn test_no_blocks_in_plain_text() {
        let eval = CodeBlockEval::new().unwrap();
        assert!(eval
            .extract_actions(&Message::assistant("no code here"))
            .is_empty());
    }

    #[test]
    fn test_overlapping_snippets_each_get_a_block() {
        let eval = CodeBlockEval::new().unwrap();
        let reply = Message::assistant(
            "```rust\nfn main() {}\n```\n\n```rust\nfn helper() {}\n```\n",
        );
        let expected = vec![
            Action::code_block(None, "fn"),
            Action::code_block(None, "fn main"),
        ];
        let result = eval.process_result(&expected, &[reply]);
        assert!(result.success);
        assert_eq!(result.action_counts().unwrap(), (2, 2));
        assert!(result.extra_actions().unwrap().is_empty());
    }
}
