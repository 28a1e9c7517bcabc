//! End-to-end pipeline tests: mocked log dataset + mocked geolocation
//! service, exercised through a real bound listener.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geodash::config::Config;

fn test_config(axiom_url: String, geo_url: String) -> Config {
    Config {
        port: 0,
        axiom_api_token: "test-token".into(),
        axiom_dataset: "audimeta".into(),
        axiom_api_url: axiom_url,
        // Nonexistent on purpose: forces remote-fallback-only mode.
        maxmind_db_path: "./does-not-exist.mmdb".into(),
        geo_api_url: geo_url,
        geo_rate_limit: 45,
        geo_rate_limit_window_secs: 60,
        google_maps_api_key: String::new(),
        frontend_dir: "./does-not-exist".into(),
    }
}

async fn spawn_app(cfg: Config) -> String {
    let state = geodash::build_state(cfg);
    let app = geodash::api::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Columnar tabular body with two talkers: 1.1.1.1 twice, 2.2.2.2 once.
fn tabular_logs() -> Value {
    json!({
        "tables": [{
            "fields": [
                {"name": "ip"}, {"name": "url"},
                {"name": "status"}, {"name": "method"}
            ],
            "columns": [
                ["1.1.1.1", "1.1.1.1", "2.2.2.2"],
                [null, null, "/a"],
                [null, null, 200],
                [null, null, "GET"]
            ]
        }]
    })
}

fn geo_success(city: &str, code: &str) -> Value {
    json!({
        "status": "success",
        "lat": 35.68,
        "lon": 139.69,
        "city": city,
        "country": "Japan",
        "countryCode": code
    })
}

async fn mock_dataset(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn geodata_merges_counts_with_remote_lookups() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    mock_dataset(&axiom, tabular_logs()).await;
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geo_success("Tokyo", "JP")))
        .expect(1)
        .mount(&geo)
        .await;
    Mock::given(method("GET"))
        .and(path("/json/2.2.2.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geo_success("Osaka", "JP")))
        .expect(1)
        .mount(&geo)
        .await;

    let base = spawn_app(test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    ))
    .await;

    let body: Value = reqwest::get(format!("{base}/api/geodata?hours=24"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 2);
    // Busiest IP first.
    assert_eq!(points[0]["ip"], "1.1.1.1");
    assert_eq!(points[0]["request_count"], 2);
    assert_eq!(points[0]["city"], "Tokyo");
    assert_eq!(points[0]["country_code"], "JP");
    assert_eq!(points[1]["ip"], "2.2.2.2");
    assert_eq!(points[1]["request_count"], 1);
    assert_eq!(points[1]["city"], "Osaka");
}

#[tokio::test]
async fn stats_tabulates_statuses_and_endpoints() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    mock_dataset(&axiom, tabular_logs()).await;

    let base = spawn_app(test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    ))
    .await;

    let body: Value = reqwest::get(format!("{base}/api/stats?hours=24"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status_codes"], json!([{"status": 200, "count": 1}]));
    assert_eq!(body["top_endpoints"], json!([{"url": "/a", "hits": 1}]));
}

#[tokio::test]
async fn upstream_failure_fails_open_on_both_endpoints() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&axiom)
        .await;

    let base = spawn_app(test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    ))
    .await;

    let resp = reqwest::get(format!("{base}/api/geodata?hours=24"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));

    let resp = reqwest::get(format!("{base}/api/stats?hours=24")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"status_codes": [], "top_endpoints": []})
    );
}

#[tokio::test]
async fn exhausted_geo_budget_serves_sentinels_without_remote_calls() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    mock_dataset(&axiom, tabular_logs()).await;
    // Budget of zero: the remote service must never be contacted.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geo_success("Tokyo", "JP")))
        .expect(0)
        .mount(&geo)
        .await;

    let mut cfg = test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    );
    cfg.geo_rate_limit = 0;
    let base = spawn_app(cfg).await;

    let body: Value = reqwest::get(format!("{base}/api/geodata?hours=24"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 2);
    for point in points {
        assert_eq!(point["city"], "Unknown");
        assert_eq!(point["country_code"], "??");
    }
    // Ordering contract holds even for sentinel entries.
    assert_eq!(points[0]["request_count"], 2);
}

#[tokio::test]
async fn repeat_requests_reuse_the_geolocation_cache() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    mock_dataset(&axiom, tabular_logs()).await;
    // One lookup per distinct IP across both requests.
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geo_success("Tokyo", "JP")))
        .expect(1)
        .mount(&geo)
        .await;
    Mock::given(method("GET"))
        .and(path("/json/2.2.2.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geo_success("Osaka", "JP")))
        .expect(1)
        .mount(&geo)
        .await;

    let base = spawn_app(test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    ))
    .await;

    for _ in 0..2 {
        let resp = reqwest::get(format!("{base}/api/geodata?hours=24"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }
}

#[tokio::test]
async fn invalid_hours_still_serves_the_default_window() {
    let axiom = MockServer::start().await;
    let geo = MockServer::start().await;

    mock_dataset(&axiom, json!({"tables": []})).await;

    let base = spawn_app(test_config(
        format!("{}/query", axiom.uri()),
        format!("{}/json", geo.uri()),
    ))
    .await;

    let resp = reqwest::get(format!("{base}/api/geodata?hours=banana"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}
