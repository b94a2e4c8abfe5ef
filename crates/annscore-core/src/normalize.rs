//! Annotation normalization.
//!
//! Converts parsed annotation lines into canonical span-keyed entries:
//! resolves relation arguments to entity spans, canonicalizes undirected
//! `Synonym-of` relations, rewrites `Hyponym-of` arguments onto the
//! representative member of each synonym pair, and deduplicates.

use std::collections::{HashMap, HashSet};

use crate::error::AnnotationError;
use crate::model::{
    AnnotationBody, EntityRef, Mode, Relation, SpanKey, COLLAPSED_LABEL, HYPONYM_LABEL,
    SYNONYM_LABEL,
};
use crate::parser::ParsedFile;

/// One scored row: a join key plus its short label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: SpanKey,
    pub label: String,
}

/// The normalized view of one `.ann` file.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDoc {
    /// Entity rows in file order, followed by deduplicated relation rows.
    pub entries: Vec<Entry>,
    /// Canonicalized, rewritten, deduplicated relations.
    pub relations: Vec<Relation>,
    /// Recoverable per-line failures collected along the way.
    pub errors: Vec<AnnotationError>,
}

impl NormalizedDoc {
    /// A document with no surviving annotations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first label recorded for `key`, if any. Duplicate keys within a
    /// file resolve first-wins.
    pub fn label_for(&self, key: &SpanKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == *key)
            .map(|e| e.label.as_str())
    }
}

/// Normalize one parsed file under the given mode.
///
/// Relation arguments resolve against entity lines seen earlier in the same
/// file; an argument that names no such entity skips the relation with a
/// diagnostic.
pub fn normalize(parsed: ParsedFile, mode: Mode) -> NormalizedDoc {
    let ParsedFile {
        annotations,
        mut errors,
    } = parsed;

    let mut by_id: HashMap<String, EntityRef> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();
    let mut relations: Vec<Relation> = Vec::new();

    for ann in annotations {
        match ann.body {
            AnnotationBody::Entity { span, .. } => {
                by_id.insert(ann.id, EntityRef::new(ann.label.clone(), span));
                let label = if mode.collapses_types() {
                    COLLAPSED_LABEL.to_string()
                } else {
                    ann.label
                };
                entries.push(Entry {
                    key: SpanKey::Entity(span),
                    label,
                });
            }
            AnnotationBody::Relation { arg1, arg2 } => {
                if mode.drops_relations() {
                    continue;
                }
                let Some(ref1) = by_id.get(&arg1) else {
                    report_unresolved(&mut errors, ann.line, arg1);
                    continue;
                };
                let Some(ref2) = by_id.get(&arg2) else {
                    report_unresolved(&mut errors, ann.line, arg2);
                    continue;
                };
                relations
                    .push(Relation::new(ann.label, ref1.clone(), ref2.clone()).canonicalize());
            }
        }
    }

    rewrite_hyponyms(&mut relations);

    let mut seen = HashSet::new();
    relations.retain(|r| seen.insert(r.clone()));

    for rel in &relations {
        entries.push(Entry {
            key: rel.key(),
            label: rel.label.clone(),
        });
    }

    NormalizedDoc {
        entries,
        relations,
        errors,
    }
}

fn report_unresolved(errors: &mut Vec<AnnotationError>, line: usize, arg: String) {
    let err = AnnotationError::UnresolvedArgument { line, arg };
    tracing::warn!("skipping relation: {err}");
    errors.push(err);
}

/// Rewrite every `Hyponym-of` argument equal to the first member of a
/// canonical `Synonym-of` pair to that pair's representative (its second
/// member), iterating until nothing changes.
///
/// Each rewrite replaces an argument with a strictly larger `EntityRef` in
/// the canonical order, so the loop terminates even on multi-hop chains.
fn rewrite_hyponyms(relations: &mut [Relation]) {
    let synonyms: Vec<(EntityRef, EntityRef)> = relations
        .iter()
        .filter(|r| r.label == SYNONYM_LABEL)
        .map(|r| (r.arg1.clone(), r.arg2.clone()))
        .collect();

    loop {
        let mut changed = false;
        for rel in relations.iter_mut().filter(|r| r.label == HYPONYM_LABEL) {
            for (a, b) in &synonyms {
                if a == b {
                    continue;
                }
                if rel.arg1 == *a {
                    rel.arg1 = b.clone();
                    changed = true;
                }
                if rel.arg2 == *a {
                    rel.arg2 = b.clone();
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}
