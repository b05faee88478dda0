//! Evaluators: policies that compare expected actions with a transcript.
//!
//! Every evaluator works the same way: keep the expected actions it
//! handles, extract observed actions from assistant messages, then apply
//! its own matching policy. Success means every handled expectation was
//! matched. Evaluators are pure and deterministic.

mod code_block;
mod composite;
mod function_call;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{
    Action, EvalError, EvalKind, EvalResult, Message, Result, EXTRA_KEY, MATCHED_KEY,
    UNMATCHED_KEY,
};

pub use code_block::CodeBlockEval;
pub use composite::CompositeEval;
pub use function_call::{ArgumentSubsetEval, FunctionCallEval, ToolSequenceEval};

/// Partition of expected and observed actions produced by a matching policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub matched: Vec<Action>,
    pub unmatched: Vec<Action>,
    /// Observed actions not consumed by any expectation.
    pub extra: Vec<Action>,
}

/// An evaluation policy.
pub trait Eval: Send + Sync {
    /// Identity of this evaluator; unique within a harness.
    fn kind(&self) -> EvalKind;

    /// Whether this evaluator scores the given expected action.
    fn handles(&self, action: &Action) -> bool;

    /// Observed actions carried by one message.
    fn extract_actions(&self, message: &Message) -> Vec<Action>;

    /// Match expected actions against observed ones.
    fn match_actions(&self, expected: &[Action], observed: &[Action]) -> MatchOutcome;

    /// Score a transcript. Inputs are only borrowed.
    fn process_result(&self, expected: &[Action], messages: &[Message]) -> EvalResult {
        let expected: Vec<Action> = expected
            .iter()
            .filter(|a| self.handles(a))
            .cloned()
            .collect();
        let observed: Vec<Action> = messages
            .iter()
            .filter(|m| m.is_assistant())
            .flat_map(|m| self.extract_actions(m))
            .collect();

        let outcome = self.match_actions(&expected, &observed);
        EvalResult::new(self.kind(), outcome.unmatched.is_empty())
            .with_actions(MATCHED_KEY, &outcome.matched)
            .with_actions(UNMATCHED_KEY, &outcome.unmatched)
            .with_actions(EXTRA_KEY, &outcome.extra)
    }
}

/// Fail with a configuration error if two evaluators share an identity.
pub fn check_eval_uniqueness(evals: &[Arc<dyn Eval>]) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for eval in evals {
        let kind = eval.kind();
        if !seen.insert(kind.as_str().to_string()) {
            duplicates.insert(kind.as_str().to_string());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(EvalError::Config(format!(
            "duplicate evaluators: {}",
            duplicates.into_iter().collect::<Vec<_>>().join(", ")
        )))
    }
}

/// One instance of each built-in evaluator.
pub fn builtin_evals() -> Result<Vec<Arc<dyn Eval>>> {
    Ok(vec![
        Arc::new(FunctionCallEval),
        Arc::new(ArgumentSubsetEval),
        Arc::new(ToolSequenceEval),
        Arc::new(CodeBlockEval::new()?),
    ])
}

/// Maximum one-to-one matching of expectations to observed actions.
///
/// `accepts` may overlap (subset, substring), so a first-fit pass can strand
/// a strict expectation whose only candidate a looser one already took.
/// Augmenting paths reassign earlier picks until no expectation can gain a
/// partner. Among equally large matchings the earliest observed candidates
/// win, which keeps equality-based policies deterministic.
pub(crate) fn match_unordered(
    expected: &[Action],
    observed: &[Action],
    accepts: impl Fn(&Action, &Action) -> bool,
) -> MatchOutcome {
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|want| {
            observed
                .iter()
                .enumerate()
                .filter(|(_, seen)| accepts(want, seen))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    // owner[j] = index of the expectation holding observed action j
    let mut owner: Vec<Option<usize>> = vec![None; observed.len()];
    for i in 0..expected.len() {
        let mut visited = vec![false; observed.len()];
        augment(i, &candidates, &mut owner, &mut visited);
    }

    let mut assigned = vec![false; expected.len()];
    for &i in owner.iter().flatten() {
        assigned[i] = true;
    }

    let mut outcome = MatchOutcome::default();
    for (want, hit) in expected.iter().zip(&assigned) {
        if *hit {
            outcome.matched.push(want.clone());
        } else {
            outcome.unmatched.push(want.clone());
        }
    }
    outcome.extra = observed
        .iter()
        .zip(&owner)
        .filter(|(_, owner)| owner.is_none())
        .map(|(a, _)| a.clone())
        .collect();
    outcome
}

fn augment(
    i: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &j in &candidates[i] {
        if visited[j] {
            continue;
        }
        visited[j] = true;
        let free = match owner[j] {
            None => true,
            Some(k) => augment(k, candidates, owner, visited),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}
