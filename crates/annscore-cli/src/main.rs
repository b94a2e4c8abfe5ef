//! annscore CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "annscore", version, about = "Brat annotation scoring toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score predicted annotations against a gold folder
    Evaluate {
        /// Folder containing gold-standard .ann files
        gold: PathBuf,

        /// Folder containing predicted .ann files
        pred: PathBuf,

        /// Annotation filter: full, rel, types, or keys
        mode: Option<String>,

        /// Skip documents whose predicted file is missing
        #[arg(long)]
        ignore_missing: bool,

        /// Decimal digits in the metric table
        #[arg(long)]
        digits: Option<usize>,

        /// Output format: text, table, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the JSON report to the configured output directory
        #[arg(long)]
        save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compute inter-annotator agreement (Cohen's kappa)
    Agreement {
        /// Folder containing the first annotator's .ann files
        gold: PathBuf,

        /// Folder containing the second annotator's .ann files
        pred: PathBuf,

        /// Annotation filter: full, rel, types, or keys
        mode: Option<String>,

        /// Skip documents missing from the second folder
        #[arg(long)]
        ignore_missing: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse and normalize a folder of .ann files, reporting problems
    Validate {
        /// Folder of .ann files
        dir: PathBuf,
    },

    /// Compare two saved evaluation reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// F1 regression threshold
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("annscore_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            gold,
            pred,
            mode,
            ignore_missing,
            digits,
            format,
            save,
            config,
        } => commands::evaluate::execute(
            gold,
            pred,
            mode,
            ignore_missing,
            digits,
            format,
            save,
            config,
        ),
        Commands::Agreement {
            gold,
            pred,
            mode,
            ignore_missing,
            config,
        } => commands::agreement::execute(gold, pred, mode, ignore_missing, config),
        Commands::Validate { dir } => commands::validate::execute(dir),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
