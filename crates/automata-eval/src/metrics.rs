//! Summary statistics over a batch of evaluation results.
//!
//! Statistics are derived from the held results on every call; nothing is
//! cached, so the results are the single source of truth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EvalResult, Result};

/// Serializable snapshot of the headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub expected_actions: usize,
    pub matched_actions: usize,
    pub action_success_rate: f64,
}

/// Immutable collection of results with derived statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationMetrics {
    results: Vec<EvalResult>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl EvaluationMetrics {
    pub fn new(results: Vec<EvalResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[EvalResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<EvalResult> {
        self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Passed / total; `0.0` for an empty batch.
    pub fn pass_rate(&self) -> f64 {
        ratio(self.passed(), self.total())
    }

    /// `(matched, expected)` action counts summed over every result.
    pub fn action_counts(&self) -> Result<(usize, usize)> {
        let mut totals = (0, 0);
        for result in &self.results {
            let (m, e) = result.action_counts()?;
            totals.0 += m;
            totals.1 += e;
        }
        Ok(totals)
    }

    /// Matched / expected actions; `0.0` when nothing was expected.
    pub fn action_success_rate(&self) -> Result<f64> {
        let (matched, expected) = self.action_counts()?;
        Ok(ratio(matched, expected))
    }

    /// How often each unexpected action label was observed.
    pub fn extra_action_frequency(&self) -> Result<BTreeMap<String, usize>> {
        let mut freq = BTreeMap::new();
        for result in &self.results {
            for action in result.all_extra_actions()? {
                *freq.entry(action.label().to_string()).or_insert(0) += 1;
            }
        }
        Ok(freq)
    }

    /// Pass rate per evaluator identity.
    pub fn pass_rate_by_kind(&self) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for result in &self.results {
            let entry = counts.entry(result.kind.to_string()).or_insert((0, 0));
            entry.1 += 1;
            if result.success {
                entry.0 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(kind, (passed, total))| (kind, ratio(passed, total)))
            .collect()
    }

    pub fn summary(&self) -> Result<MetricsSummary> {
        let (matched_actions, expected_actions) = self.action_counts()?;
        Ok(MetricsSummary {
            total: self.total(),
            passed: self.passed(),
            failed: self.failed(),
            pass_rate: self.pass_rate(),
            expected_actions,
            matched_actions,
            action_success_rate: ratio(matched_actions, expected_actions),
        })
    }
}
