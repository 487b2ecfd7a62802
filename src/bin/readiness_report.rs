//! Prints the readiness score of each country from the configured snapshot.
//!
//! Usage: `readiness_report [COUNTRY...]` (no arguments = every country
//! present in both MCI Scores and Findex).

use anyhow::{Context, Result};

use asean_fintech_readiness::config::DashboardConfig;
use asean_fintech_readiness::readiness::compute_readiness;
use asean_fintech_readiness::reshape::inner_join;
use asean_fintech_readiness::snapshot::COUNTRY_KEY;
use asean_fintech_readiness::Snapshot;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let wanted: Vec<String> = std::env::args().skip(1).collect();

    let config = DashboardConfig::load_default()?;
    let snap = Snapshot::from_config(&config)?;
    let joined = inner_join(&snap.mci_scores, &snap.findex, COUNTRY_KEY)
        .context("joining MCI Scores with Findex")?;
    let scored = compute_readiness(&joined, COUNTRY_KEY, &config.readiness.weights)
        .context("computing readiness")?;

    for record in &scored.records {
        if !wanted.is_empty() && !wanted.iter().any(|c| c == &record.country) {
            continue;
        }
        let metrics = record
            .metrics
            .iter()
            .map(|(m, v)| format!("{m}={v:.3}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<16} {:.3}  {:<10} {}",
            record.country, record.readiness_score, record.risk_level, metrics
        );
    }

    for missing in wanted
        .iter()
        .filter(|c| !scored.records.iter().any(|r| &r.country == *c))
    {
        println!("{missing:<16} no readiness data");
    }
    for w in &scored.warnings {
        println!("warning: {w}");
    }
    Ok(())
}
