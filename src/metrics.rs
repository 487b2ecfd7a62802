use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::snapshot::{Dataset, Snapshot};
use crate::views::ViewKind;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the dashboard series.
    pub fn init() -> Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(
            "dashboard_view_requests_total",
            "View computations served, by view."
        );
        describe_counter!(
            "dashboard_view_no_data_total",
            "View computations that produced no data, by view."
        );
        describe_counter!(
            "dashboard_normalize_warnings_total",
            "Metrics skipped by the normalizer (missing or non-numeric)."
        );
        describe_gauge!("dashboard_snapshot_rows", "Rows per loaded dataset.");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Count one served view. No-op until a recorder is installed.
pub fn record_view(kind: ViewKind, no_data: bool) {
    counter!("dashboard_view_requests_total", "view" => kind.as_str()).increment(1);
    if no_data {
        counter!("dashboard_view_no_data_total", "view" => kind.as_str()).increment(1);
    }
}

pub fn record_normalize_warnings(n: usize) {
    if n > 0 {
        counter!("dashboard_normalize_warnings_total").increment(n as u64);
    }
}

pub fn record_snapshot(snapshot: &Snapshot) {
    for d in Dataset::ALL {
        gauge!("dashboard_snapshot_rows", "table" => d.as_str()).set(snapshot.table(d).len() as f64);
    }
}
