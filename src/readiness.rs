// src/readiness.rs
//! # Readiness Scorer
//! Weighted composite of min-max normalized metrics + discrete risk tier.
//!
//! score = Σ over metrics present in the row of (normalized * weight).
//! The sum is NOT divided by the weight mass actually present: a country
//! missing one of four 0.25 metrics can reach at most 0.75.
//!
//! Risk tiers (checked top-down): >= 0.75 Low, >= 0.60 Medium,
//! >= 0.45 High, otherwise Very High.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::normalize::{normalize, NormalizeWarning};
use crate::table::{Table, Value};

pub const LOW_RISK_MIN: f64 = 0.75;
pub const MEDIUM_RISK_MIN: f64 = 0.60;
pub const HIGH_RISK_MIN: f64 = 0.45;

pub const READINESS_SCORE_COLUMN: &str = "readiness_score";
pub const RISK_LEVEL_COLUMN: &str = "risk_level";

/// Metrics of the default composite, named as they appear in the
/// MCI Scores / Findex exports.
pub const DEFAULT_READINESS_METRICS: [&str; 4] = [
    "Mobile ownership",
    "Account_Penetration",
    "Network coverage",
    "Literacy",
];

/// Market-entry risk derived from the readiness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= LOW_RISK_MIN {
            RiskLevel::Low
        } else if score >= MEDIUM_RISK_MIN {
            RiskLevel::Medium
        } else if score >= HIGH_RISK_MIN {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricWeight {
    pub metric: String,
    pub weight: f64,
}

/// Ordered metric → weight list. Order decides output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadinessWeights {
    weights: Vec<MetricWeight>,
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_READINESS_METRICS.iter().map(|m| (*m, 0.25)))
    }
}

impl ReadinessWeights {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: pairs
                .into_iter()
                .map(|(m, w)| MetricWeight {
                    metric: m.into(),
                    weight: w,
                })
                .collect(),
        }
    }

    pub fn metrics(&self) -> Vec<&str> {
        self.weights.iter().map(|w| w.metric.as_str()).collect()
    }

    pub fn weight_for(&self, metric: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|w| w.metric == metric)
            .map(|w| w.weight)
    }

    pub fn entries(&self) -> &[MetricWeight] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Drop non-finite / negative weights and repeated metrics (first wins).
    /// Returns the cleaned weights plus one message per dropped entry.
    pub fn sanitized(self) -> (Self, Vec<String>) {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.weights.len());
        for w in self.weights {
            if !w.weight.is_finite() || w.weight < 0.0 {
                dropped.push(format!("invalid weight {} for `{}`", w.weight, w.metric));
                continue;
            }
            if !seen.insert(w.metric.clone()) {
                dropped.push(format!("duplicate weight for `{}`", w.metric));
                continue;
            }
            kept.push(w);
        }
        (Self { weights: kept }, dropped)
    }
}

/// Score one row of normalized values. Metrics without a weight add nothing.
pub fn score<'a, I>(normalized: I, weights: &ReadinessWeights) -> (f64, RiskLevel)
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let total: f64 = normalized
        .into_iter()
        .filter_map(|(metric, v)| weights.weight_for(metric).map(|w| v * w))
        .sum();
    (total, RiskLevel::from_score(total))
}

/// One scored country. `metrics` holds only the normalized values present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessRecord {
    pub country: String,
    pub metrics: BTreeMap<String, f64>,
    pub readiness_score: f64,
    pub risk_level: RiskLevel,
}

/// Output of `compute_readiness`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readiness {
    /// Country, the normalized metric columns used, score, risk label.
    pub table: Table,
    pub records: Vec<ReadinessRecord>,
    pub warnings: Vec<NormalizeWarning>,
}

/// Normalize the weighted metrics of `table` and score every row.
///
/// Fails with `Schema` when the country column is absent or a row has no
/// country value; everything else degrades to warnings.
pub fn compute_readiness(
    table: &Table,
    country_column: &str,
    weights: &ReadinessWeights,
) -> CoreResult<Readiness> {
    if !table.has_column(country_column) {
        return Err(CoreError::schema(format!(
            "country column `{country_column}` not found"
        )));
    }

    let (norm, warnings) = normalize(table, &weights.metrics());

    let country_idx = norm.column_index(country_column).ok_or_else(|| {
        CoreError::schema(format!(
            "country column `{country_column}` was dropped during normalization"
        ))
    })?;
    let used = norm.resolve_lenient(&weights.metrics()).present;

    let mut columns = Vec::with_capacity(used.len() + 3);
    columns.push(country_column.to_string());
    columns.extend(used.iter().map(|(_, name)| name.clone()));
    columns.push(READINESS_SCORE_COLUMN.to_string());
    columns.push(RISK_LEVEL_COLUMN.to_string());

    let mut rows = Vec::with_capacity(norm.len());
    let mut records = Vec::with_capacity(norm.len());

    for (i, row) in norm.rows().iter().enumerate() {
        let country = row
            .get(country_idx)
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CoreError::schema(format!("row {i} has no country identifier")))?;

        let present: Vec<(&str, f64)> = used
            .iter()
            .filter_map(|(idx, name)| row[*idx].as_f64().map(|v| (name.as_str(), v)))
            .collect();
        let (readiness_score, risk_level) = score(present.iter().copied(), weights);
        debug!(country, readiness_score, risk = %risk_level, "scored");

        let mut out = Vec::with_capacity(columns.len());
        out.push(Value::from(country));
        out.extend(used.iter().map(|(idx, _)| row[*idx].clone()));
        out.push(Value::Number(readiness_score));
        out.push(Value::from(risk_level.label()));
        rows.push(out);

        records.push(ReadinessRecord {
            country: country.to_string(),
            metrics: present
                .into_iter()
                .map(|(m, v)| (m.to_string(), v))
                .collect(),
            readiness_score,
            risk_level,
        });
    }

    if used.is_empty() && !table.is_empty() {
        warn!("no readiness metric could be scored; every score is 0");
    }

    Ok(Readiness {
        table: Table::from_parts(columns, rows),
        records,
        warnings,
    })
}
