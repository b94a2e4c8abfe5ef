//! CLI configuration loaded from `annscore.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use annscore_core::model::Mode;

/// Defaults applied to evaluation runs; command-line flags override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnscoreConfig {
    /// Decimal digits in the metric table.
    #[serde(default = "default_digits")]
    pub digits: usize,
    /// Default annotation filter.
    #[serde(default)]
    pub mode: Mode,
    /// Skip documents whose predicted file is missing.
    #[serde(default)]
    pub ignore_missing: bool,
    /// Directory saved reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_digits() -> usize {
    2
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./annscore-results")
}

impl Default for AnnscoreConfig {
    fn default() -> Self {
        Self {
            digits: default_digits(),
            mode: Mode::Full,
            ignore_missing: false,
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `annscore.toml` in the current directory
/// 2. `~/.config/annscore/config.toml`
pub fn load_config_from(path: Option<&Path>) -> Result<AnnscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("annscore.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(AnnscoreConfig::default()),
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("annscore"))
}
