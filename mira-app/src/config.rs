use anyhow::{Context, Result};
use clap::ValueEnum;
use mira_core::{agent::AgentTuning, catalog::CropCatalog};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// How ticks are paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Run every tick back to back.
    Headless,
    /// One tick per `tick_interval_ms` of wall-clock time.
    Realtime,
}

/// A simulation run as described in `run.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunRequest {
    pub crop: String,
    /// Simulated hours per tick.
    pub speed: f64,
    pub ticks: u64,
    pub seed: Option<u64>,
    pub mode: RunMode,
    pub tick_interval_ms: u64,
    /// Directory of crop YAML files. The built-in catalog is used when unset.
    pub catalog_dir: Option<PathBuf>,
    pub output_root: PathBuf,
    pub agent: AgentTuning,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            crop: "lettuce".to_string(),
            speed: 1.0,
            ticks: 24 * 31,
            seed: None,
            mode: RunMode::Headless,
            tick_interval_ms: 3000,
            catalog_dir: None,
            output_root: PathBuf::from("./data/runs"),
            agent: AgentTuning::default(),
        }
    }
}

/// Command-line values that take precedence over the request file.
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub crop: Option<String>,
    pub speed: Option<f64>,
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub mode: Option<RunMode>,
    pub tick_interval_ms: Option<u64>,
    pub catalog_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
}

impl RunRequest {
    /// Reads the request file, or falls back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            println!(
                "Run request '{}' not found, using defaults.",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn apply(mut self, overrides: RunOverrides) -> Self {
        if let Some(crop) = overrides.crop {
            self.crop = crop;
        }
        if let Some(speed) = overrides.speed {
            self.speed = speed;
        }
        if let Some(ticks) = overrides.ticks {
            self.ticks = ticks;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(interval) = overrides.tick_interval_ms {
            self.tick_interval_ms = interval;
        }
        if overrides.catalog_dir.is_some() {
            self.catalog_dir = overrides.catalog_dir;
        }
        if let Some(root) = overrides.output_root {
            self.output_root = root;
        }
        self
    }
}

/// Loads crop definitions from `dir`, or the built-in table when no directory is given.
pub fn load_catalog(dir: Option<&Path>) -> Result<CropCatalog> {
    match dir {
        Some(dir) => {
            println!("Loading crop catalog from '{}'...", dir.display());
            let catalog = CropCatalog::load_dir(dir)
                .with_context(|| format!("Failed to load crop catalog from {}", dir.display()))?;
            println!("Loaded {} crop(s).", catalog.len());
            Ok(catalog)
        }
        None => Ok(CropCatalog::builtin()),
    }
}
