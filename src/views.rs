// src/views.rs
//! # Views
//! Pure functions producing the tabular payload of each dashboard view from
//! an immutable `Snapshot` and an explicit selection. No I/O, no globals.
//!
//! "No data" is a value, not an error: `View::no_data` plus a warning the
//! presentation layer can show as-is. `CoreError` only escapes for broken
//! preconditions (e.g. EoDB sub-indicator columns absent from Rankings).

use serde::Serialize;
use tracing::warn;

use crate::error::CoreResult;
use crate::normalize::NormalizeWarning;
use crate::readiness::{compute_readiness, ReadinessRecord, ReadinessWeights};
use crate::reshape::{
    drop_null, filter_by_country, inner_join, melt_named, numeric_columns, select_columns, top_n,
    transpose_row,
};
use crate::snapshot::{Snapshot, COUNTRY_KEY, ECONOMY_KEY};
use crate::table::Table;

pub const RADAR_COLUMNS: [&str; 3] = [
    "Mobile Social Media Penetration",
    "Mobile ownership",
    "E-Government Score",
];

pub const EODB_COLUMNS: [&str; 8] = [
    "Starting a business",
    "Getting electricity",
    "Registering property",
    "Getting credit",
    "Paying taxes",
    "Trading across borders",
    "Enforcing contracts",
    "Resolving insolvency",
];

pub const SCATTER_X: &str = "Mobile Social Media Penetration";
pub const SCATTER_Y: &str = "Account_Penetration";

/// Metrics offered by the top-performers view (MCI first, then Findex).
pub const TOP_METRICS: [&str; 4] = [
    "Mobile ownership",
    "Network coverage",
    "Literacy",
    "Account_Penetration",
];

const NO_SELECTION: &str = "No countries selected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Readiness,
    MarketReadiness,
    FinancialInclusion,
    EaseOfDoingBusiness,
    DigitalVsInclusion,
    CountrySnapshot,
    TopPerformers,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Readiness => "readiness",
            ViewKind::MarketReadiness => "market_readiness",
            ViewKind::FinancialInclusion => "financial_inclusion",
            ViewKind::EaseOfDoingBusiness => "ease_of_doing_business",
            ViewKind::DigitalVsInclusion => "digital_vs_inclusion",
            ViewKind::CountrySnapshot => "country_snapshot",
            ViewKind::TopPerformers => "top_performers",
        }
    }
}

/// Tabular payload for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub kind: ViewKind,
    pub table: Table,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub no_data: bool,
}

impl View {
    fn data(kind: ViewKind, table: Table) -> Self {
        let no_data = table.is_empty();
        Self {
            kind,
            table,
            warnings: Vec::new(),
            no_data,
        }
    }

    fn empty(kind: ViewKind, warning: impl Into<String>) -> Self {
        let warning = warning.into();
        warn!(view = kind.as_str(), "{warning}");
        Self {
            kind,
            table: Table::default(),
            warnings: vec![warning],
            no_data: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessView {
    #[serde(flatten)]
    pub view: View,
    pub records: Vec<ReadinessRecord>,
    /// Metrics the normalizer skipped (also rendered into `view.warnings`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metric_warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySnapshotView {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mci: Option<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findex: Option<Table>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub no_data: bool,
}

/// Composite readiness for the selected countries.
///
/// Normalization runs over every country present in both MCI Scores and
/// Findex, so a country's score does not move with the selection.
pub fn readiness<S: AsRef<str>>(
    snap: &Snapshot,
    countries: &[S],
    weights: &ReadinessWeights,
) -> CoreResult<ReadinessView> {
    let kind = ViewKind::Readiness;
    if countries.is_empty() {
        return Ok(ReadinessView {
            view: View::empty(kind, NO_SELECTION),
            records: Vec::new(),
            metric_warnings: Vec::new(),
        });
    }

    let joined = inner_join(&snap.mci_scores, &snap.findex, COUNTRY_KEY)?;
    let scored = compute_readiness(&joined, COUNTRY_KEY, weights)?;
    let table = filter_by_country(&scored.table, countries, COUNTRY_KEY)?;
    let records = scored
        .records
        .into_iter()
        .filter(|r| countries.iter().any(|c| c.as_ref() == r.country))
        .collect();

    let mut view = View::data(kind, table);
    view.warnings = scored.warnings.iter().map(ToString::to_string).collect();
    if view.no_data {
        let msg = "No readiness data available for the selected countries.";
        warn!(view = kind.as_str(), "{msg}");
        view.warnings.push(msg.to_string());
    }
    Ok(ReadinessView {
        view,
        records,
        metric_warnings: scored.warnings,
    })
}

/// Radar: selected countries × readiness indicators, long format.
pub fn market_readiness<S: AsRef<str>>(snap: &Snapshot, countries: &[S]) -> CoreResult<View> {
    let kind = ViewKind::MarketReadiness;
    if countries.is_empty() {
        return Ok(View::empty(kind, NO_SELECTION));
    }
    let filtered = filter_by_country(&snap.mci_scores, countries, COUNTRY_KEY)?;

    // Checked up front so melt's strict policy never fires here.
    let missing = filtered.resolve_lenient(&RADAR_COLUMNS).missing;
    if !missing.is_empty() {
        return Ok(View::empty(kind, format!("Missing columns: {missing:?}")));
    }

    let melted = melt_named(&filtered, COUNTRY_KEY, &RADAR_COLUMNS, "Metric", "Score")?;
    Ok(View::data(kind, melted))
}

/// Heatmap: country × numeric Findex indicators.
pub fn financial_inclusion<S: AsRef<str>>(snap: &Snapshot, countries: &[S]) -> CoreResult<View> {
    let kind = ViewKind::FinancialInclusion;
    if countries.is_empty() {
        return Ok(View::empty(kind, NO_SELECTION));
    }
    let filtered = filter_by_country(&snap.findex, countries, COUNTRY_KEY)?;
    if filtered.is_empty() {
        return Ok(View::empty(
            kind,
            "No financial inclusion data available for the selected countries.",
        ));
    }
    // Column types come from the whole table, not just the selected rows.
    let keep = numeric_columns(&snap.findex, COUNTRY_KEY)?;
    Ok(View::data(kind, select_columns(&filtered, &keep)?))
}

/// Grouped bar: EoDB sub-indicators per economy, long format.
pub fn ease_of_doing_business<S: AsRef<str>>(snap: &Snapshot, countries: &[S]) -> CoreResult<View> {
    let kind = ViewKind::EaseOfDoingBusiness;
    if countries.is_empty() {
        return Ok(View::empty(kind, NO_SELECTION));
    }
    let filtered = filter_by_country(&snap.rankings, countries, ECONOMY_KEY)?;
    if filtered.is_empty() {
        return Ok(View::empty(
            kind,
            "No EoDB data available for the selected countries.",
        ));
    }
    let melted = melt_named(&filtered, ECONOMY_KEY, &EODB_COLUMNS, "Indicator", "Score")?;
    Ok(View::data(kind, melted))
}

/// Scatter: digital access vs account penetration for every country in both
/// MCI Scores and Findex (independent of the selection).
pub fn digital_vs_inclusion(snap: &Snapshot) -> CoreResult<View> {
    let kind = ViewKind::DigitalVsInclusion;
    let has_columns = snap.mci_scores.has_column(COUNTRY_KEY)
        && snap.mci_scores.has_column(SCATTER_X)
        && snap.findex.has_column(COUNTRY_KEY)
        && snap.findex.has_column(SCATTER_Y);
    if !has_columns {
        return Ok(View::empty(kind, "Required columns not found for scatter plot."));
    }

    let left = select_columns(&snap.mci_scores, &[COUNTRY_KEY, SCATTER_X])?;
    let right = select_columns(&snap.findex, &[COUNTRY_KEY, SCATTER_Y])?;
    let merged = inner_join(&left, &right, COUNTRY_KEY)?;
    if merged.is_empty() {
        return Ok(View::empty(
            kind,
            "No countries appear in both MCI Scores and Findex.",
        ));
    }
    Ok(View::data(kind, merged))
}

/// Per-country snapshot: MCI Scores and Findex rows as indicator/value pairs.
pub fn country_snapshot(snap: &Snapshot, country: &str) -> CoreResult<CountrySnapshotView> {
    let mci = if snap.mci_scores.has_column(COUNTRY_KEY) {
        transpose_row(&snap.mci_scores, COUNTRY_KEY, country)?
    } else {
        None
    };
    let findex = if snap.findex.has_column(COUNTRY_KEY) {
        transpose_row(&snap.findex, COUNTRY_KEY, country)?
    } else {
        None
    };

    let no_data = mci.is_none() && findex.is_none();
    let mut warnings = Vec::new();
    if no_data {
        let msg = format!("No data available for {country}.");
        warn!(view = ViewKind::CountrySnapshot.as_str(), "{msg}");
        warnings.push(msg);
    }
    Ok(CountrySnapshotView {
        country: country.to_string(),
        mci,
        findex,
        warnings,
        no_data,
    })
}

/// Top `n` countries by one metric. Findex is searched before MCI Scores.
pub fn top_performers(snap: &Snapshot, metric: &str, n: usize) -> CoreResult<View> {
    let kind = ViewKind::TopPerformers;
    let source = if snap.findex.has_column(metric) {
        &snap.findex
    } else if snap.mci_scores.has_column(metric) {
        &snap.mci_scores
    } else {
        return Ok(View::empty(kind, format!("{metric} not found in datasets.")));
    };

    let projected = select_columns(source, &[COUNTRY_KEY, metric])?;
    let cleaned = drop_null(&projected, metric)?;
    if cleaned.is_empty() {
        return Ok(View::empty(
            kind,
            format!("No data available for the selected metric: {metric}"),
        ));
    }
    Ok(View::data(kind, top_n(&cleaned, metric, n)?))
}
