// src/config.rs
//! Dashboard configuration (TOML).
//!
//! Resolution order:
//! 1) $DASHBOARD_CONFIG_PATH (must exist)
//! 2) config/dashboard.toml
//! 3) built-in defaults
//!
//! $DASHBOARD_DATA_DIR overrides `[data].dir` afterwards.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::readiness::ReadinessWeights;

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_DATA_DIR: &str = "DASHBOARD_DATA_DIR";

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_COUNTRIES: [&str; 3] = ["Singapore", "Malaysia", "Indonesia"];

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_mci_data() -> PathBuf {
    PathBuf::from("mci_data.json")
}
fn default_mci_scores() -> PathBuf {
    PathBuf::from("mci_index_scores.json")
}
fn default_findex() -> PathBuf {
    PathBuf::from("findex.json")
}
fn default_rankings() -> PathBuf {
    PathBuf::from("rankings.json")
}
fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect()
}
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_true() -> bool {
    true
}

/// Where the four datasets live. Relative file names resolve against `dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_mci_data")]
    pub mci_data: PathBuf,
    #[serde(default = "default_mci_scores")]
    pub mci_scores: PathBuf,
    #[serde(default = "default_findex")]
    pub findex: PathBuf,
    #[serde(default = "default_rankings")]
    pub rankings: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            mci_data: default_mci_data(),
            mci_scores: default_mci_scores(),
            findex: default_findex(),
            rankings: default_rankings(),
        }
    }
}

impl DataPaths {
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.dir.join(file)
        }
    }
}

/// Defaults used when the presentation layer sends no explicit selection.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionDefaults {
    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            default_countries: default_countries(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadinessSection {
    #[serde(default)]
    pub weights: ReadinessWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataPaths,
    #[serde(default)]
    pub selection: SelectionDefaults,
    #[serde(default)]
    pub readiness: ReadinessSection,
    /// Rewrite country keys to canonical names at load time.
    #[serde(default = "default_true")]
    pub canonicalize_keys: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: DataPaths::default(),
            selection: SelectionDefaults::default(),
            readiness: ReadinessSection::default(),
            canonicalize_keys: true,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parsing dashboard config")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::load_from(&default)?
            } else {
                info!("no dashboard config found; using defaults");
                Self::default()
            }
        };

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                cfg.data.dir = PathBuf::from(dir);
            }
        }
        Ok(cfg)
    }

    fn sanitized(mut self) -> Self {
        let (weights, dropped) = self.readiness.weights.sanitized();
        for msg in dropped {
            warn!("readiness config: {msg}");
        }
        self.readiness.weights = weights;

        if self.selection.top_n == 0 {
            self.selection.top_n = DEFAULT_TOP_N;
        }
        self
    }
}
