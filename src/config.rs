use crate::rank::DEFAULT_LEADERBOARD_SIZE;
use crate::sample::DEFAULT_SEED;
use crate::score::ScoreWeights;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = ".vendorkpi.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub weights: ScoreWeights,
    pub leaderboard_size: usize,
    pub seed: u64,
    /// Canonical field name -> source column; `null` unbinds the field.
    pub columns: HashMap<String, Option<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weights: ScoreWeights::default(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            seed: DEFAULT_SEED,
            columns: HashMap::new(),
        }
    }
}

/// Load `custom_path` if given (it must exist), otherwise `.vendorkpi.json`
/// in `work_dir` if present, otherwise defaults.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = match custom_path {
        Some(p) => {
            let path = if p.is_absolute() { p.to_path_buf() } else { work_dir.join(p) };
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path
        }
        None => {
            let path = work_dir.join(CONFIG_FILENAME);
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", path.display()))
}
