//! Gold-vs-predicted alignment and folder-level scoring.
//!
//! One [`ScoreAccumulator`] is fed a document pair at a time and finalized
//! once after the whole folder has been processed.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::model::{Mode, COLLAPSED_LABEL, HYPONYM_LABEL, NONE_LABEL, SYNONYM_LABEL};
use crate::normalize::{normalize, NormalizedDoc};
use crate::parser;
use crate::statistics::{confusion_counts, micro_average, LabelCounts, LabelMetrics};

/// Pools aligned label rows across all documents of a run.
#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    mode: Mode,
    gold_labels: Vec<String>,
    pred_labels: Vec<String>,
    /// Gold labels in order of first appearance.
    targets: Vec<String>,
    pub documents_scored: usize,
    pub documents_skipped: usize,
    pub diagnostics: Vec<String>,
}

/// The finalized metric table of a run.
#[derive(Debug, Clone)]
pub struct Scores {
    pub per_label: Vec<LabelMetrics>,
    pub overall: LabelMetrics,
}

impl ScoreAccumulator {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            gold_labels: Vec::new(),
            pred_labels: Vec::new(),
            targets: Vec::new(),
            documents_scored: 0,
            documents_skipped: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The pooled parallel label sequences built so far.
    pub fn label_sequences(&self) -> (&[String], &[String]) {
        (&self.gold_labels, &self.pred_labels)
    }

    /// Align one document pair and pool its label rows.
    ///
    /// For the union of span keys, a key only in gold contributes predicted
    /// label `NONE` (a false negative); a key only in predicted contributes
    /// gold label `NONE` (a false positive).
    pub fn add_document(&mut self, gold: &NormalizedDoc, pred: &NormalizedDoc) {
        let mut seen = HashSet::new();
        for entry in gold.entries.iter().chain(pred.entries.iter()) {
            if !seen.insert(&entry.key) {
                continue;
            }
            let gold_label = gold.label_for(&entry.key);
            let pred_label = pred.label_for(&entry.key);

            if let Some(label) = gold_label {
                if !self.targets.iter().any(|t| t == label) {
                    self.targets.push(label.to_string());
                }
            }

            self.gold_labels
                .push(gold_label.unwrap_or(NONE_LABEL).to_string());
            self.pred_labels
                .push(pred_label.unwrap_or(NONE_LABEL).to_string());
        }
        self.documents_scored += 1;
    }

    /// Record a document's per-line failures as run diagnostics.
    pub fn record_errors(&mut self, doc_name: &str, doc: &NormalizedDoc) {
        for err in &doc.errors {
            self.diagnostics.push(format!("{doc_name}: {err}"));
        }
    }

    /// Compute the per-label table and the aggregate row.
    ///
    /// The aggregate is micro-averaged over all target labels; under
    /// boundary-only scoring the single collapsed label doubles as the
    /// aggregate (binary case, nothing to average).
    pub fn finalize(&self) -> Scores {
        let targets: Vec<String> = match self.mode {
            Mode::RelationsOnly => vec![HYPONYM_LABEL.to_string(), SYNONYM_LABEL.to_string()],
            _ => self.targets.clone(),
        };

        let counts = confusion_counts(&self.gold_labels, &self.pred_labels, &targets);
        let per_label: Vec<LabelMetrics> = targets
            .iter()
            .zip(&counts)
            .map(|(target, c)| LabelMetrics::from_counts(target.clone(), c))
            .collect();

        let overall = if self.mode.collapses_types() {
            per_label
                .iter()
                .find(|m| m.label == COLLAPSED_LABEL)
                .map(|m| LabelMetrics {
                    label: "overall".to_string(),
                    ..m.clone()
                })
                .unwrap_or_else(|| LabelMetrics::from_counts("overall", &LabelCounts::default()))
        } else {
            LabelMetrics::from_counts("overall", &micro_average(&counts))
        };

        Scores { per_label, overall }
    }
}

/// Outcome of an agreement run.
#[derive(Debug, Clone, Copy)]
pub struct AgreementOutcome {
    pub kappa: f64,
    pub documents_scored: usize,
    pub documents_skipped: usize,
}

/// Score every `.ann` document in `gold_dir` against its counterpart in
/// `pred_dir`.
///
/// A missing predicted file is scored as an empty prediction set, or skips
/// the document entirely when `ignore_missing` is set.
pub fn evaluate_folders(
    gold_dir: &Path,
    pred_dir: &Path,
    mode: Mode,
    ignore_missing: bool,
) -> Result<ScoreAccumulator> {
    let mut acc = ScoreAccumulator::new(mode);

    for path in parser::list_ann_files(gold_dir)? {
        let name = file_name(&path);
        let gold = normalize(parser::parse_file(&path)?, mode);
        acc.record_errors(&name, &gold);

        let pred = match load_predicted(&path, pred_dir, mode) {
            Some(pred) => {
                acc.record_errors(&name, &pred);
                pred
            }
            None => {
                if ignore_missing {
                    acc.documents_skipped += 1;
                    continue;
                }
                let msg = format!(
                    "{name} missing in {}; assuming no predictions for this file",
                    pred_dir.display()
                );
                tracing::warn!("{msg}");
                acc.diagnostics.push(msg);
                NormalizedDoc::default()
            }
        };

        acc.add_document(&gold, &pred);
    }

    Ok(acc)
}

/// Pool label rows for inter-annotator agreement and compute Cohen's kappa.
///
/// Documents whose predicted file normalizes to zero annotations are
/// treated as abandoned and skipped rather than scored as all-misses.
pub fn agreement_folders(
    gold_dir: &Path,
    pred_dir: &Path,
    mode: Mode,
    ignore_missing: bool,
) -> Result<AgreementOutcome> {
    let mut acc = ScoreAccumulator::new(mode);

    for path in parser::list_ann_files(gold_dir)? {
        let name = file_name(&path);
        let gold = normalize(parser::parse_file(&path)?, mode);

        let pred = match load_predicted(&path, pred_dir, mode) {
            Some(pred) if pred.is_empty() => {
                tracing::warn!("{name}: empty annotation set, skipping document");
                acc.documents_skipped += 1;
                continue;
            }
            Some(pred) => pred,
            None => {
                if ignore_missing {
                    acc.documents_skipped += 1;
                    continue;
                }
                tracing::warn!(
                    "{name} missing in {}; assuming no predictions for this file",
                    pred_dir.display()
                );
                NormalizedDoc::default()
            }
        };

        acc.add_document(&gold, &pred);
    }

    let (gold_labels, pred_labels) = acc.label_sequences();
    Ok(AgreementOutcome {
        kappa: crate::statistics::cohen_kappa(gold_labels, pred_labels),
        documents_scored: acc.documents_scored,
        documents_skipped: acc.documents_skipped,
    })
}

/// Load and normalize the predicted counterpart of a gold file, or `None`
/// if it cannot be read.
fn load_predicted(gold_path: &Path, pred_dir: &Path, mode: Mode) -> Option<NormalizedDoc> {
    let pred_path = pred_dir.join(gold_path.file_name()?);
    let content = std::fs::read_to_string(&pred_path).ok()?;
    Some(normalize(parser::parse_str(&content), mode))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::fs;
    use tempfile::TempDir;

    const GOLD: &str = "T1\tKEYPHRASE 0 5\tAlice\nT2\tKEYPHRASE 10 15\tlives\n";
    const PRED_PARTIAL: &str = "T1\tKEYPHRASE 0 5\tAlice\n";

    fn doc(content: &str, mode: Mode) -> NormalizedDoc {
        normalize(parse_str(content), mode)
    }

    fn folders(gold: &[(&str, &str)], pred: &[(&str, &str)]) -> (TempDir, TempDir) {
        let gold_dir = TempDir::new().unwrap();
        let pred_dir = TempDir::new().unwrap();
        for (name, content) in gold {
            fs::write(gold_dir.path().join(name), content).unwrap();
        }
        for (name, content) in pred {
            fs::write(pred_dir.path().join(name), content).unwrap();
        }
        (gold_dir, pred_dir)
    }

    #[test]
    fn identical_documents_score_one() {
        let mut acc = ScoreAccumulator::new(Mode::Full);
        let gold = doc(GOLD, Mode::Full);
        acc.add_document(&gold, &gold);
        let scores = acc.finalize();
        assert_eq!(scores.per_label.len(), 1);
        assert_eq!(scores.per_label[0].precision, 1.0);
        assert_eq!(scores.per_label[0].recall, 1.0);
        assert_eq!(scores.overall.f1, 1.0);
        assert_eq!(scores.overall.support, 2);
    }

    #[test]
    fn keyphrase_worked_example() {
        let mut acc = ScoreAccumulator::new(Mode::Full);
        acc.add_document(&doc(GOLD, Mode::Full), &doc(PRED_PARTIAL, Mode::Full));
        let scores = acc.finalize();
        let m = &scores.per_label[0];
        assert_eq!(m.label, "KEYPHRASE");
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 0.5);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.support, 2);
    }

    #[test]
    fn disjoint_documents_score_zero() {
        let mut acc = ScoreAccumulator::new(Mode::Full);
        let gold = doc("T1\tTask 0 5\ta\n", Mode::Full);
        let pred = doc("T1\tTask 20 25\tb\n", Mode::Full);
        acc.add_document(&gold, &pred);
        let scores = acc.finalize();
        assert_eq!(scores.per_label[0].precision, 0.0);
        assert_eq!(scores.per_label[0].recall, 0.0);
    }

    #[test]
    fn types_mode_reports_a_single_collapsed_label() {
        let mut acc = ScoreAccumulator::new(Mode::Boundaries);
        let gold = doc(
            "T1\tTask 0 5\ta\nT2\tProcess 10 15\tb\n",
            Mode::Boundaries,
        );
        acc.add_document(&gold, &gold);
        let scores = acc.finalize();
        assert_eq!(scores.per_label.len(), 1);
        assert_eq!(scores.per_label[0].label, COLLAPSED_LABEL);
        assert_eq!(scores.overall.precision, scores.per_label[0].precision);
        assert_eq!(scores.overall.support, 2);
    }

    #[test]
    fn keys_mode_scores_fixed_relation_targets() {
        let content = "T1\tTask 0 5\ta\nT2\tTask 10 15\tb\nR1\tHyponym-of Arg1:T1 Arg2:T2\n";
        let mut acc = ScoreAccumulator::new(Mode::RelationsOnly);
        let gold = doc(content, Mode::RelationsOnly);
        acc.add_document(&gold, &gold);
        let scores = acc.finalize();
        let names: Vec<_> = scores.per_label.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(names, vec![HYPONYM_LABEL, SYNONYM_LABEL]);
        assert_eq!(scores.per_label[0].f1, 1.0);
        // entity rows agree but are not pooled into relation-only targets
        assert_eq!(scores.overall.support, 1);
    }

    #[test]
    fn missing_predicted_file_counts_gold_as_misses() {
        let (gold_dir, pred_dir) = folders(&[("doc1.ann", GOLD)], &[]);
        let acc = evaluate_folders(gold_dir.path(), pred_dir.path(), Mode::Full, false).unwrap();
        assert_eq!(acc.documents_scored, 1);
        let scores = acc.finalize();
        assert_eq!(scores.per_label[0].recall, 0.0);
        assert_eq!(scores.per_label[0].support, 2);
        assert!(!acc.diagnostics.is_empty());
    }

    #[test]
    fn ignore_missing_skips_the_document() {
        let (gold_dir, pred_dir) = folders(&[("doc1.ann", GOLD)], &[]);
        let acc = evaluate_folders(gold_dir.path(), pred_dir.path(), Mode::Full, true).unwrap();
        assert_eq!(acc.documents_scored, 0);
        assert_eq!(acc.documents_skipped, 1);
        assert!(acc.finalize().per_label.is_empty());
    }

    #[test]
    fn evaluate_folders_end_to_end() {
        let (gold_dir, pred_dir) = folders(
            &[("a.ann", GOLD), ("b.ann", GOLD)],
            &[("a.ann", GOLD), ("b.ann", PRED_PARTIAL)],
        );
        let acc = evaluate_folders(gold_dir.path(), pred_dir.path(), Mode::Full, false).unwrap();
        assert_eq!(acc.documents_scored, 2);
        let scores = acc.finalize();
        // 3 of 4 gold spans predicted
        assert_eq!(scores.overall.precision, 1.0);
        assert_eq!(scores.overall.recall, 0.75);
        assert_eq!(scores.overall.support, 4);
    }

    #[test]
    fn agreement_on_identical_folders_is_one() {
        let (gold_dir, pred_dir) = folders(&[("a.ann", GOLD)], &[("a.ann", GOLD)]);
        let outcome =
            agreement_folders(gold_dir.path(), pred_dir.path(), Mode::Full, false).unwrap();
        assert_eq!(outcome.kappa, 1.0);
        assert_eq!(outcome.documents_scored, 1);
    }

    #[test]
    fn agreement_skips_empty_predicted_documents() {
        let (gold_dir, pred_dir) = folders(&[("a.ann", GOLD)], &[("a.ann", "")]);
        let outcome =
            agreement_folders(gold_dir.path(), pred_dir.path(), Mode::Full, false).unwrap();
        assert_eq!(outcome.documents_scored, 0);
        assert_eq!(outcome.documents_skipped, 1);
    }

    #[test]
    fn diagnostics_carry_the_file_name() {
        let (gold_dir, pred_dir) = folders(
            &[("a.ann", "T1\tTask\nT2\tTask 0 5\tok\n")],
            &[("a.ann", GOLD)],
        );
        let acc = evaluate_folders(gold_dir.path(), pred_dir.path(), Mode::Full, false).unwrap();
        assert!(acc.diagnostics.iter().any(|d| d.starts_with("a.ann:")));
    }
}
