use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bounty_core::{derive_hash_hex, produce_outcome, EngineParams, ReelsConfig, Symbol};
use bounty_server::{app, config::ServerConfig, AppState};

fn test_app() -> (Router, Arc<AppState>) {
    let config = ServerConfig {
        reel_seed: Some(7),
        sim_max_rounds: 5_000,
        sim_shards: 2,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::from_config(&config).unwrap());
    (app(state.clone()), state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn commit_spin_and_verify() {
    let (app, state) = test_app();
    let (status, commit) = call(&app, "GET", "/api/get-server-hash", None).await;
    assert_eq!(status, StatusCode::OK);
    let commit_id = commit["commitId"].as_str().unwrap().to_string();
    let server_hash = commit["serverHash"].as_str().unwrap().to_string();

    let (status, spin) = call(
        &app,
        "POST",
        "/api/spin",
        Some(json!({ "commitId": commit_id, "clientSeed": "howdy", "bet": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seed = spin["serverSeed"].as_str().unwrap();
    assert_eq!(derive_hash_hex(seed.as_bytes()), server_hash);
    assert_eq!(spin["grid"].as_array().unwrap().len(), 3);
    let multiplier = spin["multiplier"].as_u64().unwrap();
    assert_eq!(spin["payout"].as_f64().unwrap(), multiplier as f64 * 2.0);
    assert_eq!(
        spin["bonusTriggered"].as_bool().unwrap(),
        spin["scatterCount"].as_u64().unwrap() >= 3
    );

    // an auditor holding only the published strips recomputes the grid
    let (_, strips) = call(&app, "GET", "/api/reel-strips", None).await;
    let strips: Vec<Vec<Symbol>> = serde_json::from_value(strips["strips"].clone()).unwrap();
    let auditor = EngineParams {
        reels: ReelsConfig::from_strips(strips).unwrap(),
        ..state.spins.params().clone()
    };
    let outcome = produce_outcome(&auditor, seed, "howdy").unwrap();
    let grid: Vec<Vec<String>> = outcome
        .grid
        .iter()
        .map(|row| row.iter().map(|s| s.id().to_string()).collect())
        .collect();
    assert_eq!(spin["grid"], json!(grid));
    assert_eq!(multiplier, outcome.total_multiplier);
}

#[tokio::test]
async fn replayed_commit_is_rejected() {
    let (app, _) = test_app();
    let (_, commit) = call(&app, "GET", "/api/get-server-hash", None).await;
    let body = json!({ "commitId": commit["commitId"], "bet": 1 });
    let (status, _) = call(&app, "POST", "/api/spin", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = call(&app, "POST", "/api/spin", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "invalid or expired commitId");
}

#[tokio::test]
async fn invalid_input_is_rejected_without_consuming() {
    let (app, state) = test_app();
    let (status, err) = call(&app, "POST", "/api/spin", Some(json!({ "bet": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "missing commitId");

    let (_, commit) = call(&app, "GET", "/api/get-server-hash", None).await;
    for bet in [0.0, 51.0, -3.0] {
        let (status, err) = call(
            &app,
            "POST",
            "/api/spin",
            Some(json!({ "commitId": commit["commitId"], "bet": bet })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().starts_with("invalid bet amount"));
    }
    assert_eq!(state.spins.commitments().len(), 1);
}

#[tokio::test]
async fn simulate_route_reports_statistics() {
    let (app, _) = test_app();
    let (status, report) = call(&app, "POST", "/api/simulate-rtp", Some(json!({ "rounds": 300 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalSpins"], 300);
    assert_eq!(report["totalBet"].as_f64().unwrap(), 300.0);
    assert!(report["baseGameRTP"].as_f64().unwrap() >= 0.0);
    assert_eq!(report["cancelled"], false);

    let (status, _) = call(&app, "POST", "/api/simulate-rtp", Some(json!({ "rounds": 6_000 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
