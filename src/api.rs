// src/api.rs
//! HTTP surface for the dashboard front-end.
//!
//! Handlers only parse the selection, call the pure view functions in
//! [`crate::views`] and serialize the result. The snapshot is shared
//! read-only, so no locks are involved.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::config::{DashboardConfig, SelectionDefaults};
use crate::error::CoreError;
use crate::metrics::{record_normalize_warnings, record_view};
use crate::readiness::ReadinessWeights;
use crate::snapshot::{KeyIssue, Snapshot};
use crate::views::{self, CountrySnapshotView, ReadinessView, View, ViewKind, TOP_METRICS};

#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<Snapshot>,
    pub weights: Arc<ReadinessWeights>,
    pub selection: Arc<SelectionDefaults>,
}

impl AppState {
    pub fn new(snapshot: Snapshot, config: &DashboardConfig) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            weights: Arc::new(config.readiness.weights.clone()),
            selection: Arc::new(config.selection.clone()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/countries", get(countries))
        .route("/views/readiness", get(readiness_view))
        .route("/views/radar", get(radar_view))
        .route("/views/inclusion", get(inclusion_view))
        .route("/views/eodb", get(eodb_view))
        .route("/views/scatter", get(scatter_view))
        .route("/views/snapshot", get(snapshot_view))
        .route("/views/top", get(top_view))
        .route("/views/top/metrics", get(top_metrics))
        .route("/debug/key-issues", get(key_issues))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Core errors become `422` with the offending columns listed.
#[derive(Debug)]
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    columns: &'a [String],
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.to_string(),
            columns: self.0.columns(),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
struct SelectionQuery {
    /// Comma separated. Absent = configured defaults, empty = nothing selected.
    countries: Option<String>,
}

impl SelectionQuery {
    fn resolve(&self, defaults: &SelectionDefaults) -> Vec<String> {
        match &self.countries {
            None => defaults.default_countries.clone(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CountryQuery {
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TopQuery {
    metric: Option<String>,
    n: Option<usize>,
}

fn served(view: View) -> Json<View> {
    record_view(view.kind, view.no_data);
    Json(view)
}

async fn countries(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.snapshot.countries())
}

async fn readiness_view(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> ApiResult<ReadinessView> {
    let selected = q.resolve(&state.selection);
    debug!(countries = ?selected, "readiness view");
    let out = views::readiness(&state.snapshot, &selected, &state.weights)?;
    record_view(out.view.kind, out.view.no_data);
    record_normalize_warnings(out.metric_warnings.len());
    Ok(Json(out))
}

async fn radar_view(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> ApiResult<View> {
    let selected = q.resolve(&state.selection);
    Ok(served(views::market_readiness(&state.snapshot, &selected)?))
}

async fn inclusion_view(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> ApiResult<View> {
    let selected = q.resolve(&state.selection);
    Ok(served(views::financial_inclusion(&state.snapshot, &selected)?))
}

async fn eodb_view(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> ApiResult<View> {
    let selected = q.resolve(&state.selection);
    Ok(served(views::ease_of_doing_business(&state.snapshot, &selected)?))
}

async fn scatter_view(State(state): State<AppState>) -> ApiResult<View> {
    Ok(served(views::digital_vs_inclusion(&state.snapshot)?))
}

async fn snapshot_view(
    State(state): State<AppState>,
    Query(q): Query<CountryQuery>,
) -> ApiResult<CountrySnapshotView> {
    // Without a country, fall back to the first configured default.
    let country = q
        .country
        .or_else(|| state.selection.default_countries.first().cloned())
        .unwrap_or_default();
    let out = views::country_snapshot(&state.snapshot, country.trim())?;
    record_view(ViewKind::CountrySnapshot, out.no_data);
    Ok(Json(out))
}

async fn top_view(State(state): State<AppState>, Query(q): Query<TopQuery>) -> ApiResult<View> {
    let metric = q.metric.unwrap_or_else(|| TOP_METRICS[0].to_string());
    let n = q.n.filter(|&n| n > 0).unwrap_or(state.selection.top_n);
    Ok(served(views::top_performers(&state.snapshot, &metric, n)?))
}

async fn top_metrics() -> Json<[&'static str; 4]> {
    Json(TOP_METRICS)
}

async fn key_issues(State(state): State<AppState>) -> Json<Vec<KeyIssue>> {
    Json(state.snapshot.key_issues().to_vec())
}
