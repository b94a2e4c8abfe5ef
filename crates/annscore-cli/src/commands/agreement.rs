//! The `annscore agreement` command.

use std::path::PathBuf;

use anyhow::Result;

use annscore_core::model::Mode;
use annscore_core::scorer;

use crate::config;

pub fn execute(
    gold: PathBuf,
    pred: PathBuf,
    mode: Option<String>,
    ignore_missing: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = config::load_config_from(config_path.as_deref())?;

    let mode = match mode {
        Some(s) => s
            .parse::<Mode>()
            .map_err(|e| anyhow::anyhow!("{e} (expected full, rel, types, or keys)"))?,
        None => config.mode,
    };
    let ignore_missing = ignore_missing || config.ignore_missing;

    let outcome = scorer::agreement_folders(&gold, &pred, mode, ignore_missing)?;

    println!("Cohen's kappa: {:.4}", outcome.kappa);
    println!(
        "{} document(s) scored, {} skipped",
        outcome.documents_scored, outcome.documents_skipped
    );

    Ok(())
}
