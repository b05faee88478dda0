use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::metrics::{EvaluationMetrics, MetricsSummary};

/// Current schema version of the report artifact.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// One evaluation result in the persisted report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalResultArtifact {
    pub index: usize,
    pub kind: String,
    pub success: bool,
    pub matched_actions: usize,
    pub expected_actions: usize,
}

/// Canonical report written after an evaluation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalReportArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Option<String>,
    pub session_id: Option<String>,
    pub summary: MetricsSummary,
    pub pass_rate_by_kind: BTreeMap<String, f64>,
    pub results: Vec<EvalResultArtifact>,
}

impl EvalReportArtifact {
    pub fn from_metrics(
        metrics: &EvaluationMetrics,
        session_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<Self> {
        let summary = metrics.summary().context("summarize metrics")?;
        let results = metrics
            .results()
            .iter()
            .enumerate()
            .map(|(index, r)| -> Result<EvalResultArtifact> {
                let (matched_actions, expected_actions) = r
                    .action_counts()
                    .with_context(|| format!("count actions of result {index}"))?;
                Ok(EvalResultArtifact {
                    index,
                    kind: r.kind.to_string(),
                    success: r.success,
                    matched_actions,
                    expected_actions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: run_id.map(str::to_string),
            session_id: session_id.map(str::to_string),
            summary,
            pass_rate_by_kind: metrics.pass_rate_by_kind(),
            results,
        })
    }
}

/// Write the report in pretty JSON format.
pub fn write_metrics_json(path: &Path, artifact: &EvalReportArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize eval report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render markdown summary for terminal or PR output.
pub fn render_metrics_md(artifact: &EvalReportArtifact) -> String {
    let s = &artifact.summary;
    let mut out = String::new();
    out.push_str("# Evaluation Summary\n\n");
    if let Some(run_id) = &artifact.run_id {
        out.push_str(&format!("Run: `{}`\n\n", run_id));
    }
    out.push_str(&format!(
        "- results: {}\n- passed: {}\n- failed: {}\n- pass rate: {:.1}%\n- actions matched: {}/{} ({:.1}%)\n",
        s.total,
        s.passed,
        s.failed,
        s.pass_rate * 100.0,
        s.matched_actions,
        s.expected_actions,
        s.action_success_rate * 100.0
    ));

    if !artifact.pass_rate_by_kind.is_empty() {
        out.push_str("\n## By Evaluator\n");
        for (kind, rate) in &artifact.pass_rate_by_kind {
            out.push_str(&format!("- `{}`: {:.1}%\n", kind, rate * 100.0));
        }
    }

    let failures: Vec<_> = artifact.results.iter().filter(|r| !r.success).collect();
    if !failures.is_empty() {
        out.push_str("\n## Failures\n");
        for r in failures {
            out.push_str(&format!(
                "- #{} `{}`: {}/{} actions matched\n",
                r.index, r.kind, r.matched_actions, r.expected_actions
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, EvalKind, EvalResult, MATCHED_KEY, UNMATCHED_KEY};
    use serde_json::json;

    fn metrics() -> EvaluationMetrics {
        let hit = Action::function_call("search", json!({"q": "rust"}));
        let miss = Action::function_call("stop", json!({}));
        EvaluationMetrics::new(vec![
            EvalResult::new(EvalKind::FunctionCall, true).with_actions(MATCHED_KEY, &[hit]),
            EvalResult::new(EvalKind::ToolSequence, false).with_actions(UNMATCHED_KEY, &[miss]),
        ])
    }

    #[test]
    fn test_report_rows_follow_results() {
        let report = EvalReportArtifact::from_metrics(&metrics(), Some("s1"), Some("r1")).unwrap();
        assert_eq!(report.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[1].kind, "tool_sequence");
        assert_eq!(report.results[1].expected_actions, 1);
        assert_eq!(report.summary.passed, 1);
    }

    #[test]
    fn test_write_and_read_back_json() {
        let report = EvalReportArtifact::from_metrics(&metrics(), None, Some("r1")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval_report.json");
        write_metrics_json(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: EvalReportArtifact = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_markdown_lists_failures() {
        let report = EvalReportArtifact::from_metrics(&metrics(), None, Some("r1")).unwrap();
        let md = render_metrics_md(&report);
        assert!(md.contains("# Evaluation Summary"));
        assert!(md.contains("Run: `r1`"));
        assert!(md.contains("- pass rate: 50.0%"));
        assert!(md.contains("#1 `tool_sequence`: 0/1 actions matched"));
        assert!(!md.contains("#0 `function_call`"));
    }
}
