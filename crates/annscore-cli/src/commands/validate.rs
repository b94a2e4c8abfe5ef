//! The `annscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use annscore_core::model::Mode;
use annscore_core::normalize::normalize;
use annscore_core::parser;

pub fn execute(dir: PathBuf) -> Result<()> {
    let files = parser::list_ann_files(&dir)?;

    let mut total_problems = 0;

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let doc = normalize(parser::parse_file(path)?, Mode::Full);

        let entity_count = doc.entries.len() - doc.relations.len();
        println!(
            "{name}: {entity_count} entities, {} relations",
            doc.relations.len()
        );

        for err in &doc.errors {
            println!("  WARNING: {err}");
        }
        total_problems += doc.errors.len();
    }

    if files.is_empty() {
        println!("No .ann files found in {}", dir.display());
    } else if total_problems == 0 {
        println!("All annotation files valid.");
    } else {
        println!("\n{total_problems} problem(s) found.");
    }

    Ok(())
}
