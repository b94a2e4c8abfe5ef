//! The `annscore evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use annscore_core::model::Mode;
use annscore_core::report::EvaluationReport;
use annscore_core::scorer;

use crate::config;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    gold: PathBuf,
    pred: PathBuf,
    mode: Option<String>,
    ignore_missing: bool,
    digits: Option<usize>,
    format: String,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = config::load_config_from(config_path.as_deref())?;

    let mode = match mode {
        Some(s) => s
            .parse::<Mode>()
            .map_err(|e| anyhow::anyhow!("{e} (expected full, rel, types, or keys)"))?,
        None => config.mode,
    };
    let digits = digits.unwrap_or(config.digits);
    let ignore_missing = ignore_missing || config.ignore_missing;

    tracing::debug!("evaluate: mode={mode} digits={digits} ignore_missing={ignore_missing}");

    let acc = scorer::evaluate_folders(&gold, &pred, mode, ignore_missing)?;
    let report = EvaluationReport::from_run(&acc, &gold, &pred);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => {
            print_table(&report, digits);
        }
        _ => {
            print!("{}", report.to_text(digits));
        }
    }

    if report.documents_skipped > 0 {
        eprintln!("{} document(s) skipped", report.documents_skipped);
    }

    if save {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = config.output_dir.join(format!("report-{timestamp}.json"));
        report
            .save_json(&path)
            .with_context(|| format!("failed to save report to {}", path.display()))?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_table(report: &EvaluationReport, digits: usize) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Label", "Precision", "Recall", "F1", "Support"]);

    for row in report
        .per_label
        .iter()
        .chain(std::iter::once(&report.overall))
    {
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(format!("{:.digits$}", row.precision)),
            Cell::new(format!("{:.digits$}", row.recall)),
            Cell::new(format!("{:.digits$}", row.f1)),
            Cell::new(row.support),
        ]);
    }

    println!("{table}");
}
