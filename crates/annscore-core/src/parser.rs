//! Brat standoff (`.ann`) parser.
//!
//! Parses tab-separated annotation lines into [`Annotation`] records and
//! loads whole directories of `.ann` files. Malformed lines are skipped and
//! reported, never fatal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::AnnotationError;
use crate::model::{Annotation, AnnotationBody, Span};

/// The parsed content of one `.ann` file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// Annotations in file order.
    pub annotations: Vec<Annotation>,
    /// Lines that could not be parsed.
    pub errors: Vec<AnnotationError>,
}

/// Parse one annotation line. `line_no` is 1-based and used for diagnostics.
///
/// Entity lines look like `T1\tTask 5 10\tsome text`; relation lines (labels
/// ending in `-of`) look like `R1\tHyponym-of Arg1:T1 Arg2:T2`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Annotation, AnnotationError> {
    let mut fields = line.trim().split('\t');
    let id = fields.next().unwrap_or_default();
    let Some(body) = fields.next() else {
        return Err(AnnotationError::MissingFields {
            line: line_no,
            found: 1,
        });
    };
    let text = fields.next().unwrap_or_default();

    let mut tokens = body.split(' ');
    let label = tokens.next().unwrap_or_default().to_string();

    if label.ends_with("-of") {
        let arg1 = tokens
            .next()
            .ok_or(AnnotationError::MissingArgument {
                line: line_no,
                which: "Arg1",
            })?
            .trim_start_matches("Arg1:")
            .to_string();
        let arg2 = tokens
            .next()
            .ok_or(AnnotationError::MissingArgument {
                line: line_no,
                which: "Arg2",
            })?
            .trim_start_matches("Arg2:")
            .to_string();
        Ok(Annotation {
            id: id.to_string(),
            label,
            line: line_no,
            body: AnnotationBody::Relation { arg1, arg2 },
        })
    } else {
        let start = parse_offset(tokens.next(), line_no)?;
        let end = parse_offset(tokens.next(), line_no)?;
        Ok(Annotation {
            id: id.to_string(),
            label,
            line: line_no,
            body: AnnotationBody::Entity {
                span: Span::new(start, end),
                text: text.to_string(),
            },
        })
    }
}

fn parse_offset(token: Option<&str>, line_no: usize) -> Result<usize, AnnotationError> {
    let token = token.ok_or(AnnotationError::MissingOffsets { line: line_no })?;
    token
        .parse()
        .map_err(|_| AnnotationError::InvalidOffset {
            line: line_no,
            value: token.to_string(),
        })
}

/// Parse the contents of a whole `.ann` file.
///
/// Blank lines, notes (`#`), and equivalence lines (`*`) are skipped
/// silently; anything else that fails to parse is recorded in `errors`.
pub fn parse_str(content: &str) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('*') {
            continue;
        }
        match parse_line(line, idx + 1) {
            Ok(annotation) => parsed.annotations.push(annotation),
            Err(e) => {
                tracing::warn!("skipping annotation: {e}");
                parsed.errors.push(e);
            }
        }
    }

    parsed
}

/// Read and parse one `.ann` file.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read annotation file: {}", path.display()))?;
    Ok(parse_str(&content))
}

/// List the `.ann` files in a folder, sorted by filename so runs are
/// deterministic. Other files are ignored.
pub fn list_ann_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ann") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
