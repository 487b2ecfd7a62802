// tests/api_http.rs
//
// HTTP-level tests for the dashboard Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health, /countries, /views/top/metrics
// - selection parsing (absent = defaults, empty = nothing selected)
// - view payloads and the 422 error mapping

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use asean_fintech_readiness::api::{self, AppState};
use asean_fintech_readiness::config::DashboardConfig;
use asean_fintech_readiness::{Snapshot, Table};

const BODY_LIMIT: usize = 1024 * 1024;

fn table(json: &str) -> Table {
    Table::from_json_str(json).expect("fixture table")
}

fn fixture_snapshot() -> Snapshot {
    let mci_scores = table(
        r#"{"columns":["Country","Mobile Social Media Penetration","Mobile ownership","E-Government Score","Network coverage","Literacy"],
            "data":[["Singapore",0.90,95,0.92,100,97],
                    ["Malaysia",0.80,85,0.75,96,95],
                    ["Indonesia",0.60,65,0.55,90,96],
                    ["Myanmar",0.40,55,0.30,80,89]]}"#,
    );
    let findex = table(
        r#"{"columns":["Country","Account_Penetration","Region"],
            "data":[["Singapore",98,"SEA"],["Malaysia",88,"SEA"],["Indonesia",52,"SEA"],["Myanmar",48,"SEA"]]}"#,
    );
    // EoDB sub-indicators deliberately incomplete.
    let rankings = table(
        r#"{"columns":["Economy","Starting a business"],"data":[["Singapore",98.2]]}"#,
    );
    Snapshot::new(Table::new(["Country"]), mci_scores, findex, rankings)
}

/// Build the same Router the binary uses (minus `/metrics`).
fn test_router() -> Router {
    let state = AppState::new(fixture_snapshot(), &DashboardConfig::default());
    api::router(state)
}

async fn get(uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = test_router().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8_lossy(&bytes).trim(), "OK");
}

#[tokio::test]
async fn countries_come_from_mci_scores_in_order() {
    let (status, v) = get("/countries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v,
        serde_json::json!(["Singapore", "Malaysia", "Indonesia", "Myanmar"])
    );
}

#[tokio::test]
async fn readiness_without_param_uses_default_selection() {
    let (status, v) = get("/views/readiness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["kind"], "readiness");
    assert_eq!(v["no_data"], false);

    let records = v["records"].as_array().expect("records array");
    let names: Vec<&str> = records.iter().filter_map(|r| r["country"].as_str()).collect();
    assert_eq!(names, vec!["Singapore", "Malaysia", "Indonesia"]);
    assert_eq!(records[0]["risk_level"], "Low");
}

#[tokio::test]
async fn readiness_with_empty_param_is_skipped() {
    let (status, v) = get("/views/readiness?countries=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["no_data"], true);
    assert_eq!(v["warnings"][0], "No countries selected.");
}

#[tokio::test]
async fn radar_is_long_format() {
    let (status, v) = get("/views/radar?countries=Singapore,Myanmar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v["table"]["columns"],
        serde_json::json!(["Country", "Metric", "Score"])
    );
    assert_eq!(v["table"]["data"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn eodb_with_missing_indicators_is_422() {
    let (status, v) = get("/views/eodb?countries=Singapore").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let cols = v["columns"].as_array().expect("columns array");
    assert_eq!(cols.len(), 7);
    assert!(v["error"].as_str().unwrap_or_default().starts_with("missing columns"));
}

#[tokio::test]
async fn unknown_country_snapshot_is_no_data_not_error() {
    let (status, v) = get("/views/snapshot?country=Atlantis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["no_data"], true);
    assert_eq!(v["warnings"][0], "No data available for Atlantis.");

    let (_, v) = get("/views/snapshot?country=Malaysia").await;
    assert_eq!(v["no_data"], false);
    assert_eq!(v["mci"]["columns"], serde_json::json!(["Indicator", "Value"]));
}

#[tokio::test]
async fn top_view_honours_metric_and_n() {
    let (status, v) = get("/views/top?metric=Account_Penetration&n=2").await;
    assert_eq!(status, StatusCode::OK);
    let rows = v["table"]["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Singapore");
    assert_eq!(rows[1][0], "Malaysia");

    let (_, v) = get("/views/top?metric=GDP").await;
    assert_eq!(v["no_data"], true);
    assert_eq!(v["warnings"][0], "GDP not found in datasets.");

    let (_, v) = get("/views/top/metrics").await;
    assert_eq!(v.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn scatter_and_inclusion_views() {
    let (_, v) = get("/views/scatter").await;
    assert_eq!(
        v["table"]["columns"],
        serde_json::json!(["Country", "Mobile Social Media Penetration", "Account_Penetration"])
    );

    let (_, v) = get("/views/inclusion?countries=Indonesia").await;
    assert_eq!(
        v["table"]["columns"],
        serde_json::json!(["Country", "Account_Penetration"])
    );
}
