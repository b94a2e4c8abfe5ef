//! Core data model types for annscore.
//!
//! These are the fundamental types the entire annscore system uses to
//! represent brat standoff annotations, span keys, and scoring modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The label recorded for a span key that is absent from one side of a
/// gold/predicted comparison.
pub const NONE_LABEL: &str = "NONE";

/// Placeholder label used when entity types are collapsed for
/// boundary-only scoring.
pub const COLLAPSED_LABEL: &str = "KEYPHRASE-NOTYPES";

/// The undirected relation label.
pub const SYNONYM_LABEL: &str = "Synonym-of";

/// The directed relation label.
pub const HYPONYM_LABEL: &str = "Hyponym-of";

/// A character-offset span identifying an annotated text region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// First character offset.
    pub start: usize,
    /// One past the last character offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.end)
    }
}

/// A resolved relation argument: the entity's literal label plus its span.
///
/// Relation join keys carry the label on purpose: two relations over the
/// same offsets but differently-typed endpoints do not match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub label: String,
    pub span: Span,
}

impl EntityRef {
    pub fn new(label: impl Into<String>, span: Span) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    /// Total ordering used for synonym canonicalization: end offset, then
    /// start offset, then label.
    pub fn canonical_key(&self) -> (usize, usize, &str) {
        (self.span.end, self.span.start, &self.label)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.label, self.span.start, self.span.end)
    }
}

/// A labeled edge between two entity references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub label: String,
    pub arg1: EntityRef,
    pub arg2: EntityRef,
}

impl Relation {
    pub fn new(label: impl Into<String>, arg1: EntityRef, arg2: EntityRef) -> Self {
        Self {
            label: label.into(),
            arg1,
            arg2,
        }
    }

    /// `Synonym-of` is undirected; store the smaller argument first.
    /// Directed relations are returned unchanged. Idempotent.
    pub fn canonicalize(mut self) -> Self {
        if self.label == SYNONYM_LABEL && self.arg2.canonical_key() < self.arg1.canonical_key() {
            std::mem::swap(&mut self.arg1, &mut self.arg2);
        }
        self
    }

    /// The join key for this relation.
    pub fn key(&self) -> SpanKey {
        SpanKey::Relation(self.arg1.clone(), self.arg2.clone())
    }
}

/// Join key between gold and predicted annotation sets: a bare span for
/// entities, the pair of resolved endpoints for relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKey {
    Entity(Span),
    Relation(EntityRef, EntityRef),
}

impl fmt::Display for SpanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanKey::Entity(span) => write!(f, "{span}"),
            SpanKey::Relation(a, b) => write!(f, "{a} {b}"),
        }
    }
}

/// One parsed line of a brat `.ann` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Annotation identifier, e.g. `T1` or `R1`.
    pub id: String,
    /// Entity type or relation label.
    pub label: String,
    /// 1-based source line, kept for diagnostics.
    pub line: usize,
    pub body: AnnotationBody,
}

/// The payload of an annotation line.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationBody {
    /// An entity with its character span and surface text.
    Entity { span: Span, text: String },
    /// A relation between two entity identifiers, unresolved.
    Relation { arg1: String, arg2: String },
}

impl Annotation {
    /// Whether this line carries a relation (brat relation labels end in
    /// `-of`).
    pub fn is_relation(&self) -> bool {
        matches!(self.body, AnnotationBody::Relation { .. })
    }
}

/// Which annotation categories to keep or collapse before scoring.
///
/// Mirrors the original tool's `remove_anno` argument: `rel` drops
/// relations, `types` additionally collapses entity labels to
/// [`COLLAPSED_LABEL`], `keys` scores relation labels only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Score entities and relations with their literal labels.
    #[default]
    #[serde(rename = "full")]
    Full,
    /// Drop relations; score keyphrase boundaries and classification.
    #[serde(rename = "rel")]
    NoRelations,
    /// Drop relations and collapse entity labels; boundary recognition only.
    #[serde(rename = "types")]
    Boundaries,
    /// Score only `Hyponym-of` and `Synonym-of` labels.
    #[serde(rename = "keys")]
    RelationsOnly,
}

impl Mode {
    /// Relation lines are dropped during normalization.
    pub fn drops_relations(self) -> bool {
        matches!(self, Mode::NoRelations | Mode::Boundaries)
    }

    /// Entity labels are collapsed to [`COLLAPSED_LABEL`].
    pub fn collapses_types(self) -> bool {
        matches!(self, Mode::Boundaries)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::NoRelations => write!(f, "rel"),
            Mode::Boundaries => write!(f, "types"),
            Mode::RelationsOnly => write!(f, "keys"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "full" => Ok(Mode::Full),
            "rel" => Ok(Mode::NoRelations),
            "types" => Ok(Mode::Boundaries),
            "keys" => Ok(Mode::RelationsOnly),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(label: &str, start: usize, end: usize) -> EntityRef {
        EntityRef::new(label, Span::new(start, end))
    }

    #[test]
    fn mode_round_trip() {
        for mode in [
            Mode::Full,
            Mode::NoRelations,
            Mode::Boundaries,
            Mode::RelationsOnly,
        ] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn empty_string_is_full_mode() {
        assert_eq!("".parse::<Mode>().unwrap(), Mode::Full);
    }

    #[test]
    fn unknown_mode_rejected() {
        assert!("bogus".parse::<Mode>().is_err());
    }

    #[test]
    fn synonym_canonicalization_orders_by_end_offset() {
        let rel = Relation::new(SYNONYM_LABEL, entity("Task", 20, 30), entity("Task", 0, 5));
        let canonical = rel.canonicalize();
        assert_eq!(canonical.arg1.span, Span::new(0, 5));
        assert_eq!(canonical.arg2.span, Span::new(20, 30));
    }

    #[test]
    fn synonym_canonicalization_is_idempotent() {
        let rel = Relation::new(SYNONYM_LABEL, entity("Task", 20, 30), entity("Task", 0, 5));
        let once = rel.canonicalize();
        let twice = once.clone().canonicalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn hyponym_is_not_reordered() {
        let rel = Relation::new(HYPONYM_LABEL, entity("Task", 20, 30), entity("Task", 0, 5));
        let canonical = rel.clone().canonicalize();
        assert_eq!(canonical, rel);
    }

    #[test]
    fn relation_keys_include_entity_labels() {
        let a = Relation::new(HYPONYM_LABEL, entity("Task", 0, 5), entity("Task", 10, 15));
        let b = Relation::new(
            HYPONYM_LABEL,
            entity("Process", 0, 5),
            entity("Task", 10, 15),
        );
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn span_ordering() {
        assert!(Span::new(0, 5) < Span::new(0, 6));
        assert!(Span::new(0, 9) < Span::new(1, 2));
    }
}
