//! Annotation error types.
//!
//! These errors represent per-line failures in `.ann` files. They are kept
//! separate from the fatal I/O path so the parser and normalizer can skip
//! the offending line with a diagnostic instead of aborting the run.

use thiserror::Error;

/// A recoverable failure on a single annotation line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// The line has fewer tab-separated fields than the format requires.
    #[error("line {line}: expected id and body fields, found {found}")]
    MissingFields { line: usize, found: usize },

    /// An entity line without both boundary offsets.
    #[error("line {line}: entity annotation is missing offsets")]
    MissingOffsets { line: usize },

    /// A boundary offset that is not an integer.
    #[error("line {line}: invalid offset {value:?}")]
    InvalidOffset { line: usize, value: String },

    /// A relation line without one of its `Arg` fields.
    #[error("line {line}: relation is missing its {which} argument")]
    MissingArgument { line: usize, which: &'static str },

    /// A relation argument that names no previously seen entity.
    #[error("line {line}: relation argument {arg:?} does not resolve to an entity")]
    UnresolvedArgument { line: usize, arg: String },
}

impl AnnotationError {
    /// The 1-based source line the failure was found on.
    pub fn line(&self) -> usize {
        match self {
            AnnotationError::MissingFields { line, .. }
            | AnnotationError::MissingOffsets { line }
            | AnnotationError::InvalidOffset { line, .. }
            | AnnotationError::MissingArgument { line, .. }
            | AnnotationError::UnresolvedArgument { line, .. } => *line,
        }
    }
}
