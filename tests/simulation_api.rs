mod support;

use reqwest::StatusCode;
use serde_json::{Value, json};

async fn post_json(client: &reqwest::Client, url: String, body: Value) -> reqwest::Response {
    client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("request should succeed")
}

#[tokio::test]
async fn server_boots_with_one_aircraft_at_origin() {
    let base_url = support::spawn_server();

    let aircraft: Vec<Value> = reqwest::get(format!("{base_url}/aircraft"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");

    assert_eq!(aircraft.len(), 1);
    assert_eq!(aircraft[0]["x"], json!(0.0));
    assert_eq!(aircraft[0]["y"], json!(0.0));
    assert_eq!(aircraft[0]["heading"], json!(0));
}

#[tokio::test]
async fn next_advances_tick_and_spawns() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base_url}/simulation/next"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), StatusCode::OK);

    let snapshot: Value = res.json().await.expect("json body");
    assert_eq!(snapshot["tick"], json!(1));
    assert_eq!(snapshot["aircraft"].as_array().map(Vec::len), Some(2));
    assert!(snapshot["listing"].as_str().is_some_and(|s| s.lines().count() == 2));
}

#[tokio::test]
async fn start_resets_the_simulation() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    for _ in 0..3 {
        client
            .post(format!("{base_url}/simulation/next"))
            .send()
            .await
            .expect("request should succeed");
    }

    let snapshot: Value = client
        .post(format!("{base_url}/simulation/start"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");
    assert_eq!(snapshot["tick"], json!(0));
    assert_eq!(snapshot["aircraft"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn evolve_moves_existing_aircraft() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    let res = post_json(
        &client,
        format!("{base_url}/simulation/evolve"),
        json!({ "dt": 2.0 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let snapshot: Value = res.json().await.expect("json body");
    assert_eq!(snapshot["tick"], json!(0));
    let y = snapshot["aircraft"][0]["y"].as_f64().expect("y coordinate");
    assert!((y - 2.0).abs() < 1e-3);
}

#[tokio::test]
async fn spawn_query_and_instruct_aircraft() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    let res = post_json(
        &client,
        format!("{base_url}/aircraft"),
        json!({ "x": 10.0, "y": -5.0, "altitude_ft": 8000.0, "speed_kt": 250.0, "heading": 450 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await.expect("json body")["id"]
        .as_u64()
        .expect("aircraft id");

    let aircraft: Value = reqwest::get(format!("{base_url}/aircraft/{id}"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");
    assert_eq!(aircraft["heading"], json!(90));
    assert_eq!(aircraft["altitude_ft"], json!(8000.0));

    let res = post_json(
        &client,
        format!("{base_url}/aircraft/{id}/instruction"),
        json!({ "altitude_ft": 10000.0, "speed_kt": 280.0, "heading": 180 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unknown_aircraft_returns_not_found() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    let res = reqwest::get(format!("{base_url}/aircraft/9999"))
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = post_json(
        &client,
        format!("{base_url}/aircraft/9999/instruction"),
        json!({ "altitude_ft": 1000.0, "speed_kt": 100.0, "heading": 0 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.expect("json body");
    assert!(body["error"].as_str().is_some_and(|e| e.contains("9999")));
}

#[tokio::test]
async fn log_snapshot_returns_no_content() {
    let base_url = support::spawn_server();
    let res = reqwest::Client::new()
        .post(format!("{base_url}/simulation/log"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn overflowing_evolve_is_rejected_and_moves_nothing() {
    let base_url = support::spawn_server();
    let client = reqwest::Client::new();

    let res = post_json(
        &client,
        format!("{base_url}/aircraft"),
        json!({ "speed_kt": 1e300 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = post_json(
        &client,
        format!("{base_url}/simulation/evolve"),
        json!({ "dt": 1e10 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let aircraft: Vec<Value> = reqwest::get(format!("{base_url}/aircraft"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");
    assert_eq!(aircraft.len(), 2);
    assert!(aircraft.iter().all(|a| a["y"] == json!(0.0)));
}

#[tokio::test]
async fn negative_speed_spawn_is_rejected() {
    let base_url = support::spawn_server();
    let res = post_json(
        &reqwest::Client::new(),
        format!("{base_url}/aircraft"),
        json!({ "speed_kt": -10.0 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.expect("json body");
    assert!(body["error"].as_str().is_some_and(|e| e.contains("negative")));
}
