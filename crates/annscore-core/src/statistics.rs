//! Multiclass precision/recall/F1 statistics and Cohen's kappa.
//!
//! The metric kernel shared by folder scoring and agreement runs: one-vs-rest
//! confusion counts over parallel label sequences, micro and macro averaging,
//! accuracy, and chance-corrected agreement.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One-vs-rest confusion counts for a single label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Number of gold occurrences of the label.
    pub support: usize,
}

impl LabelCounts {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        harmonic(self.precision(), self.recall())
    }

    /// Pool counts from another label into this one.
    pub fn merge(&mut self, other: &LabelCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.support += other.support;
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Precision/recall/F1/support for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl LabelMetrics {
    pub fn from_counts(label: impl Into<String>, counts: &LabelCounts) -> Self {
        Self {
            label: label.into(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            support: counts.support,
        }
    }
}

/// Count one-vs-rest confusion statistics for each target label over two
/// parallel label sequences.
///
/// Labels outside `targets` (including the absent-side placeholder) affect
/// the counts only by disagreeing with a target label.
pub fn confusion_counts(gold: &[String], pred: &[String], targets: &[String]) -> Vec<LabelCounts> {
    targets
        .iter()
        .map(|target| {
            let mut counts = LabelCounts::default();
            for (g, p) in gold.iter().zip(pred.iter()) {
                let in_gold = g == target;
                let in_pred = p == target;
                if in_gold {
                    counts.support += 1;
                    if in_pred {
                        counts.true_positives += 1;
                    } else {
                        counts.false_negatives += 1;
                    }
                } else if in_pred {
                    counts.false_positives += 1;
                }
            }
            counts
        })
        .collect()
}

/// Micro-average: pool true/false positive and negative counts across all
/// labels before computing precision and recall.
pub fn micro_average(counts: &[LabelCounts]) -> LabelCounts {
    let mut pooled = LabelCounts::default();
    for c in counts {
        pooled.merge(c);
    }
    pooled
}

/// Macro-average: the unweighted mean of per-label precision, recall, and F1.
pub fn macro_average(metrics: &[LabelMetrics]) -> (f64, f64, f64) {
    if metrics.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = metrics.len() as f64;
    let p = metrics.iter().map(|m| m.precision).sum::<f64>() / n;
    let r = metrics.iter().map(|m| m.recall).sum::<f64>() / n;
    let f = metrics.iter().map(|m| m.f1).sum::<f64>() / n;
    (p, r, f)
}

/// Fraction of positions where the two sequences agree.
pub fn accuracy(gold: &[String], pred: &[String]) -> f64 {
    if gold.is_empty() {
        return 0.0;
    }
    let agree = gold.iter().zip(pred.iter()).filter(|(g, p)| g == p).count();
    agree as f64 / gold.len() as f64
}

/// Cohen's kappa between two annotators' parallel label sequences.
///
/// When expected agreement is 1 (both sequences constant) the usual formula
/// is undefined; perfect agreement scores 1.0 and anything else 0.0.
pub fn cohen_kappa(a: &[String], b: &[String]) -> f64 {
    const EPS: f64 = 1e-12;

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let n = a.len().min(b.len()) as f64;

    let observed = accuracy(a, b);

    let mut counts_a: HashMap<&str, usize> = HashMap::new();
    let mut counts_b: HashMap<&str, usize> = HashMap::new();
    for (x, y) in a.iter().zip(b.iter()) {
        *counts_a.entry(x.as_str()).or_default() += 1;
        *counts_b.entry(y.as_str()).or_default() += 1;
    }

    let expected: f64 = counts_a
        .iter()
        .map(|(label, &ca)| {
            let cb = counts_b.get(label).copied().unwrap_or(0);
            (ca as f64 / n) * (cb as f64 / n)
        })
        .sum();

    if (1.0 - expected).abs() < EPS {
        return if (1.0 - observed).abs() < EPS { 1.0 } else { 0.0 };
    }

    (observed - expected) / (1.0 - expected)
}
