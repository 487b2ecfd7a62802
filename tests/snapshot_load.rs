// tests/snapshot_load.rs
//
// Loading the four split-orient JSON tables from disk, with and without
// key canonicalization.

use std::fs;
use std::path::Path;

use asean_fintech_readiness::config::{DashboardConfig, DataPaths};
use asean_fintech_readiness::snapshot::{Dataset, COUNTRY_KEY, ECONOMY_KEY};
use asean_fintech_readiness::views;
use asean_fintech_readiness::{Snapshot, Value};

fn write_fixtures(dir: &Path) {
    fs::write(
        dir.join("mci_data.json"),
        r#"{"columns":["Country","Year"],"index":[0],"data":[["Viet Nam",2019]]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("mci_index_scores.json"),
        r#"{"columns":["Country","Mobile ownership","Network coverage","Literacy"],
            "index":[0,1,2],
            "data":[["Singapore",95,100,97],["Viet Nam",70,95,95],["Lao PDR",null,85,84]]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("findex.json"),
        r#"{"columns":["Country","Account_Penetration"],
            "data":[["Singapore",98],["Vietnam",31],["Laos",37]]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("rankings.json"),
        r#"{"columns":["Economy","Ease of doing business score"],
            "data":[["Singapore",86.2],["Singapur",1.0]]}"#,
    )
    .unwrap();
}

fn config_for(dir: &Path, canonicalize: bool) -> DashboardConfig {
    DashboardConfig {
        data: DataPaths {
            dir: dir.to_path_buf(),
            ..DataPaths::default()
        },
        canonicalize_keys: canonicalize,
        ..DashboardConfig::default()
    }
}

#[test]
fn load_reads_all_four_tables() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixtures(tmp.path());

    let snap = Snapshot::from_config(&config_for(tmp.path(), false)).unwrap();
    assert_eq!(snap.table(Dataset::MciData).len(), 1);
    assert_eq!(snap.table(Dataset::MciScores).len(), 3);
    assert_eq!(snap.table(Dataset::Findex).len(), 3);
    assert_eq!(snap.table(Dataset::Rankings).len(), 2);
    assert!(snap.key_issues().is_empty());
    assert_eq!(snap.mci_scores.value(2, "Mobile ownership"), Some(&Value::Null));
}

#[test]
fn canonicalization_lets_alias_spellings_join() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixtures(tmp.path());

    // Raw keys: "Viet Nam" vs "Vietnam" never match.
    let raw = Snapshot::from_config(&config_for(tmp.path(), false)).unwrap();
    let v = views::readiness(&raw, &["Vietnam"], &Default::default()).unwrap();
    assert!(v.view.no_data);

    let snap = Snapshot::from_config(&config_for(tmp.path(), true)).unwrap();
    assert_eq!(snap.mci_scores.value(1, COUNTRY_KEY), Some(&Value::from("Vietnam")));
    assert_eq!(snap.mci_scores.value(2, COUNTRY_KEY), Some(&Value::from("Laos")));

    let v = views::readiness(&snap, &["Vietnam", "Laos"], &Default::default()).unwrap();
    assert!(!v.view.no_data);
    assert_eq!(v.records.len(), 2);

    let issues = snap.key_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].dataset, Dataset::Rankings);
    assert_eq!(issues[0].value, "Singapur");
    assert_eq!(issues[0].suggestion, Some("Singapore"));
    assert_eq!(snap.rankings.value(1, ECONOMY_KEY), Some(&Value::from("Singapur")));
}

#[test]
fn missing_file_names_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Snapshot::load(&DataPaths {
        dir: tmp.path().to_path_buf(),
        ..DataPaths::default()
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("mci_data.json"), "{err:#}");
}

#[test]
fn ragged_rows_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixtures(tmp.path());
    fs::write(
        tmp.path().join("findex.json"),
        r#"{"columns":["Country","Account_Penetration"],"data":[["Singapore"]]}"#,
    )
    .unwrap();
    let err = Snapshot::from_config(&config_for(tmp.path(), false)).unwrap_err();
    assert!(format!("{err:#}").contains("findex.json"), "{err:#}");
}
