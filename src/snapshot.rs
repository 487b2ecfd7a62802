// src/snapshot.rs
//! # Snapshot
//! The four dashboard datasets, loaded once and shared read-only.
//!
//! Every view takes `&Snapshot` plus plain selection parameters; nothing
//! reads ambient/global state. Key canonicalization runs once at load time
//! so all tables share one country key domain.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{DashboardConfig, DataPaths};
use crate::country::{CountryRegistry, Resolution};
use crate::reshape::unique_values;
use crate::table::{Table, Value};

pub const COUNTRY_KEY: &str = "Country";
pub const ECONOMY_KEY: &str = "Economy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    MciData,
    MciScores,
    Findex,
    Rankings,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::MciData,
        Dataset::MciScores,
        Dataset::Findex,
        Dataset::Rankings,
    ];

    /// Column holding the country name in this dataset.
    pub fn key_column(self) -> &'static str {
        match self {
            Dataset::Rankings => ECONOMY_KEY,
            _ => COUNTRY_KEY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::MciData => "mci_data",
            Dataset::MciScores => "mci_scores",
            Dataset::Findex => "findex",
            Dataset::Rankings => "rankings",
        }
    }
}

/// A key value that did not resolve to a known country at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyIssue {
    pub dataset: Dataset,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub mci_data: Table,
    pub mci_scores: Table,
    pub findex: Table,
    pub rankings: Table,
    pub loaded_at: DateTime<Utc>,
    key_issues: Vec<KeyIssue>,
}

impl Snapshot {
    pub fn new(mci_data: Table, mci_scores: Table, findex: Table, rankings: Table) -> Self {
        Self {
            mci_data,
            mci_scores,
            findex,
            rankings,
            loaded_at: Utc::now(),
            key_issues: Vec::new(),
        }
    }

    /// Load the four tables from disk (pandas split-orient JSON).
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let snap = Self::new(
            load_table(&paths.resolve(&paths.mci_data))?,
            load_table(&paths.resolve(&paths.mci_scores))?,
            load_table(&paths.resolve(&paths.findex))?,
            load_table(&paths.resolve(&paths.rankings))?,
        );
        for d in Dataset::ALL {
            info!(dataset = d.as_str(), rows = snap.table(d).len(), "dataset loaded");
        }
        Ok(snap)
    }

    /// Load per config, canonicalizing keys when enabled.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let snap = Self::load(&config.data)?;
        if config.canonicalize_keys {
            return Ok(snap.canonicalized(&CountryRegistry::seeded()));
        }
        Ok(snap)
    }

    pub fn table(&self, dataset: Dataset) -> &Table {
        match dataset {
            Dataset::MciData => &self.mci_data,
            Dataset::MciScores => &self.mci_scores,
            Dataset::Findex => &self.findex,
            Dataset::Rankings => &self.rankings,
        }
    }

    fn table_mut(&mut self, dataset: Dataset) -> &mut Table {
        match dataset {
            Dataset::MciData => &mut self.mci_data,
            Dataset::MciScores => &mut self.mci_scores,
            Dataset::Findex => &mut self.findex,
            Dataset::Rankings => &mut self.rankings,
        }
    }

    /// Rewrite every key cell to its canonical country name; collect the
    /// values that could not be resolved (kept unchanged).
    pub fn canonicalized(mut self, registry: &CountryRegistry) -> Self {
        let mut issues = Vec::new();
        for d in Dataset::ALL {
            let key = d.key_column();
            let table = self.table_mut(d);
            let Some(idx) = table.column_index(key) else {
                warn!(dataset = d.as_str(), key, "key column missing; skipping canonicalization");
                continue;
            };
            let mut reported = HashSet::new();
            for row in table.rows_mut() {
                let Some(raw) = row[idx].as_str() else {
                    continue;
                };
                match registry.resolve(raw) {
                    Resolution::Known(c) => {
                        if raw != c.name {
                            row[idx] = Value::from(c.name);
                        }
                    }
                    Resolution::Unknown { suggestion } => {
                        if reported.insert(raw.to_string()) {
                            warn!(
                                dataset = d.as_str(),
                                value = raw,
                                suggestion = suggestion.unwrap_or("-"),
                                "unknown country key"
                            );
                            issues.push(KeyIssue {
                                dataset: d,
                                value: raw.to_string(),
                                suggestion,
                            });
                        }
                    }
                }
            }
        }
        self.key_issues = issues;
        self
    }

    /// Keys that did not resolve during canonicalization.
    pub fn key_issues(&self) -> &[KeyIssue] {
        &self.key_issues
    }

    /// Country choices for pickers: MCI Scores countries, first-seen order.
    pub fn countries(&self) -> Vec<String> {
        unique_values(&self.mci_scores, COUNTRY_KEY).unwrap_or_default()
    }
}

fn load_table(path: &Path) -> Result<Table> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading dataset from {}", path.display()))?;
    Table::from_json_str(&raw).with_context(|| format!("parsing dataset {}", path.display()))
}
