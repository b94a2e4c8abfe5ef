//! Evaluation reports with fixed-width rendering, JSON persistence, and
//! baseline comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Mode;
use crate::scorer::ScoreAccumulator;
use crate::statistics::LabelMetrics;

/// A complete evaluation report for one gold/predicted folder pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Folder containing the gold-standard files.
    pub gold_folder: String,
    /// Folder containing the predicted files.
    pub pred_folder: String,
    /// Annotation filter the run used.
    pub mode: Mode,
    /// Per-label metric rows in target order.
    pub per_label: Vec<LabelMetrics>,
    /// Micro-averaged aggregate row.
    pub overall: LabelMetrics,
    /// Documents aligned and pooled.
    pub documents_scored: usize,
    /// Documents skipped (missing predictions with the skip flag set).
    pub documents_skipped: usize,
    /// Per-line diagnostics encountered during the run.
    pub diagnostics: Vec<String>,
}

impl EvaluationReport {
    /// Build a report from a finalized accumulator.
    pub fn from_run(acc: &ScoreAccumulator, gold_folder: &Path, pred_folder: &Path) -> Self {
        let scores = acc.finalize();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            gold_folder: gold_folder.display().to_string(),
            pred_folder: pred_folder.display().to_string(),
            mode: acc.mode(),
            per_label: scores.per_label,
            overall: scores.overall,
            documents_scored: acc.documents_scored,
            documents_skipped: acc.documents_skipped,
            diagnostics: acc.diagnostics.clone(),
        }
    }

    /// Render the classic fixed-width table: an 11-character label column
    /// and four 9-character metric columns, one row per target label, then
    /// the `avg / total` aggregate.
    pub fn to_text(&self, digits: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:>11}{:>9}{:>9}{:>9}{:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        ));
        out.push('\n');
        for row in &self.per_label {
            out.push_str(&format_row(&row.label, row, digits));
        }
        out.push('\n');
        out.push_str(&format_row("avg / total", &self.overall, digits));
        out.push('\n');
        out
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: EvaluationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline to detect per-label F1
    /// regressions beyond `threshold`.
    pub fn compare(&self, baseline: &EvaluationReport, threshold: f64) -> RegressionReport {
        let baseline_f1 = |label: &str| {
            baseline
                .per_label
                .iter()
                .chain(std::iter::once(&baseline.overall))
                .find(|m| m.label == label)
                .map(|m| m.f1)
        };

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_labels = 0usize;

        for row in self.per_label.iter().chain(std::iter::once(&self.overall)) {
            let Some(base) = baseline_f1(&row.label) else {
                new_labels += 1;
                continue;
            };
            let delta = row.f1 - base;
            let entry = LabelDelta {
                label: row.label.clone(),
                baseline_f1: base,
                current_f1: row.f1,
                delta,
            };
            if delta < -threshold {
                regressions.push(entry);
            } else if delta > threshold {
                improvements.push(entry);
            } else {
                unchanged += 1;
            }
        }

        let removed_labels = baseline
            .per_label
            .iter()
            .filter(|m| !self.per_label.iter().any(|c| c.label == m.label))
            .count();

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            new_labels,
            removed_labels,
        }
    }
}

fn format_row(label: &str, metrics: &LabelMetrics, digits: usize) -> String {
    format!(
        "{:>11}{:>9}{:>9}{:>9}{:>9}\n",
        label,
        format!("{:.digits$}", metrics.precision),
        format!("{:.digits$}", metrics.recall),
        format!("{:.digits$}", metrics.f1),
        metrics.support
    )
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Labels whose F1 went down.
    pub regressions: Vec<LabelDelta>,
    /// Labels whose F1 went up.
    pub improvements: Vec<LabelDelta>,
    /// Labels with no significant change.
    pub unchanged: usize,
    /// Labels in current but not baseline.
    pub new_labels: usize,
    /// Labels in baseline but not current.
    pub removed_labels: usize,
}

/// One label's F1 movement between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDelta {
    pub label: String,
    pub baseline_f1: f64,
    pub current_f1: f64,
    pub delta: f64,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, rows) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Label | Baseline F1 | Current F1 | Delta |\n");
            md.push_str("|-------|-------------|------------|-------|\n");
            for r in rows {
                md.push_str(&format!(
                    "| {} | {:.3} | {:.3} | {:+.3} |\n",
                    r.label, r.baseline_f1, r.current_f1, r.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
