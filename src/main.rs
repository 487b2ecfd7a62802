//! ASEAN Fintech Readiness: binary entrypoint.
//! Loads the dataset snapshot once and serves the dashboard views over Axum.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use asean_fintech_readiness::api::{self, AppState};
use asean_fintech_readiness::config::DashboardConfig;
use asean_fintech_readiness::metrics::{record_snapshot, Metrics};
use asean_fintech_readiness::Snapshot;

/// Compact logs by default; `DASHBOARD_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("asean_fintech_readiness=info,warn"));

    let json = std::env::var("DASHBOARD_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Shuttle may have installed a subscriber already; keep theirs then.
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = DashboardConfig::load_default().context("loading dashboard config")?;
    let snapshot = Snapshot::from_config(&config).context("loading dataset snapshot")?;
    info!(
        countries = snapshot.countries().len(),
        key_issues = snapshot.key_issues().len(),
        "snapshot ready"
    );

    let metrics = Metrics::init()?;
    record_snapshot(&snapshot);

    let state = AppState::new(snapshot, &config);
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
