// tests/normalize_bounds.rs
//
// Randomized checks for the min-max normalizer:
// - every normalized value lands in [0, 1]
// - min maps to 0, max maps to 1 (non-constant columns)
// - row count and untouched columns survive
// Seeded RNG keeps failures reproducible.

use rand::{rngs::StdRng, Rng, SeedableRng};

use asean_fintech_readiness::normalize::{normalize, NormalizeWarning};
use asean_fintech_readiness::{Table, Value};

fn random_table(rng: &mut StdRng, rows: usize) -> Table {
    let data = (0..rows)
        .map(|i| {
            let literacy = if rng.random_bool(0.15) {
                Value::Null
            } else {
                Value::Number(rng.random_range(-50.0..150.0))
            };
            vec![
                Value::from(format!("C{i}")),
                literacy,
                Value::Number(rng.random_range(0.0..1.0)),
            ]
        })
        .collect();
    Table::from_rows(["Country", "Literacy", "Network coverage"], data).unwrap()
}

#[test]
fn normalized_values_stay_within_unit_interval() {
    let mut rng = StdRng::seed_from_u64(0xA5EA);
    for round in 0..200 {
        let rows = rng.random_range(1..40);
        let t = random_table(&mut rng, rows);
        let (out, warnings) = normalize(&t, &["Literacy", "Network coverage"]);

        assert!(warnings.is_empty(), "round {round}: {warnings:?}");
        assert_eq!(out.len(), t.len(), "rows are never dropped");
        assert_eq!(out.columns(), t.columns());

        for metric in ["Literacy", "Network coverage"] {
            let idx = out.column_index(metric).unwrap();
            for v in out.column_values(idx).filter_map(Value::as_f64) {
                assert!((0.0..=1.0).contains(&v), "round {round}: {metric}={v}");
            }
        }
    }
}

#[test]
fn extremes_map_to_zero_and_one() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let t = random_table(&mut rng, 12);
        let src = t.column_index("Network coverage").unwrap();
        let (out, _) = normalize(&t, &["Network coverage"]);

        let (min, max) = t.numeric_range(src).unwrap();
        if min == max {
            continue;
        }
        for (i, row) in t.rows().iter().enumerate() {
            let raw = row[src].as_f64().unwrap();
            let got = out.value(i, "Network coverage").and_then(Value::as_f64).unwrap();
            if raw == min {
                assert_eq!(got, 0.0);
            }
            if raw == max {
                assert_eq!(got, 1.0);
            }
        }
    }
}

#[test]
fn constant_column_maps_to_one_and_nulls_stay_null() {
    let t = Table::from_rows(
        ["Country", "Literacy"],
        vec![
            vec!["Singapore".into(), 90.0.into()],
            vec!["Brunei".into(), Value::Null],
            vec!["Laos".into(), 90.0.into()],
        ],
    )
    .unwrap();
    let (out, warnings) = normalize(&t, &["Literacy"]);
    assert!(warnings.is_empty());
    assert_eq!(out.value(0, "Literacy"), Some(&Value::Number(1.0)));
    assert_eq!(out.value(1, "Literacy"), Some(&Value::Null));
    assert_eq!(out.value(2, "Literacy"), Some(&Value::Number(1.0)));
}

#[test]
fn missing_and_text_metrics_become_warnings() {
    let t = Table::from_rows(
        ["Country", "Region", "Literacy"],
        vec![
            vec!["Singapore".into(), "SEA".into(), 97.0.into()],
            vec!["Vietnam".into(), "SEA".into(), 95.0.into()],
        ],
    )
    .unwrap();
    let (out, warnings) = normalize(&t, &["Mobile ownership", "Region", "Literacy"]);
    assert_eq!(
        warnings,
        vec![
            NormalizeWarning::MissingMetric("Mobile ownership".into()),
            NormalizeWarning::NonNumericMetric("Region".into()),
        ]
    );
    assert_eq!(out.columns(), ["Country", "Literacy"]);
    assert_eq!(warnings[1].to_string(), "Skipping non-numeric metric: `Region`");
}
