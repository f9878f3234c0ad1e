//! End-to-end tests of the tool surface against an on-disk store and a
//! mock Open-Meteo server.

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use somnair_core::{LookupConfig, OpenMeteoClient};
use somnair_service::{DefaultsConfig, ToolSurface};
use somnair_store::Store;

async fn open_meteo() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Jakarta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "name": "Jakarta",
                "latitude": -6.2146,
                "longitude": 106.8451,
                "admin1": "DKI Jakarta",
                "country": "Indonesia"
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .and(query_param("latitude", "-6.2146"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": { "pm2_5": 48.26 }
        })))
        .mount(&server)
        .await;

    server
}

fn surface(store: Store, server: &MockServer) -> ToolSurface {
    let client = OpenMeteoClient::new(LookupConfig::with_base_url(&server.uri())).unwrap();
    ToolSurface::new(Arc::new(store), Arc::new(client))
}

#[tokio::test]
async fn conversation_flow_over_every_tool() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("database").join("sleep_data.db");
    let server = open_meteo().await;
    let tools = surface(Store::open(&db_path).unwrap(), &server);

    let analysis = tools
        .dispatch("analyze", &json!({"pm25": 28, "sleep_duration_hours": "7"}))
        .await;
    assert_eq!(analysis["ok"], true);
    assert_eq!(analysis["result"]["zone"], "moderate");
    assert_eq!(analysis["result"]["risk_relative_percent"], 67.2);
    assert_eq!(analysis["result"]["tips"].as_array().unwrap().len(), 3);

    let logged = tools
        .dispatch(
            "log",
            &json!({"pm25": 35, "sleep_duration_hours": 6, "quality_label": "buruk", "note": "AC bocor"}),
        )
        .await;
    assert_eq!(logged["ok"], true);
    assert_eq!(logged["result"]["status"], "OK");
    assert_eq!(logged["result"]["id"], 1);

    let summary = tools.dispatch("summarize", &json!({"days": 7})).await;
    assert_eq!(summary["ok"], true);
    assert_eq!(summary["result"]["count"], 1);
    assert_eq!(summary["result"]["avg_pm"], 35.0);
    assert_eq!(summary["result"]["avg_duration_hours"], 6.0);
    let row = &summary["result"]["recent"][0];
    assert_eq!(row[1], 35.0);
    assert_eq!(row[2], 6.0);
    assert_eq!(row[3], "buruk");
    assert_eq!(row[4], "AC bocor");

    let air = tools
        .dispatch("lookup_current", &json!({"location": "Jakarta"}))
        .await;
    assert_eq!(air["ok"], true);
    assert_eq!(air["result"]["location"], "Jakarta, DKI Jakarta, Indonesia");
    assert_eq!(air["result"]["pm25"], 48.3);
    assert_eq!(air["result"]["category"], "poor");

    assert!(db_path.exists());
}

#[tokio::test]
async fn unresolvable_location_is_an_envelope_not_a_failure() {
    let server = open_meteo().await;
    let tools = surface(Store::open_in_memory().unwrap(), &server);

    let envelope = tools
        .dispatch("lookup_current", &json!({"location": "Kota Yang Tidak Ada"}))
        .await;
    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"]["code"], "lookup_not_found");
    assert!(
        envelope["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Kota Yang Tidak Ada")
    );
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let client = OpenMeteoClient::new(LookupConfig {
        timeout_secs: 2,
        ..LookupConfig::with_base_url("http://127.0.0.1:9")
    })
    .unwrap();
    let tools = ToolSurface::new(Arc::new(Store::open_in_memory().unwrap()), Arc::new(client));

    let envelope = tools
        .dispatch("lookup_current", &json!({"location": "Jakarta"}))
        .await;
    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"]["code"], "network_error");
}

#[tokio::test]
async fn invalid_log_writes_nothing() {
    let server = open_meteo().await;
    let tools = surface(Store::open_in_memory().unwrap(), &server);

    for args in [
        json!({"pm25": "banyak", "sleep_duration_hours": 7}),
        json!({"pm25": -3, "sleep_duration_hours": 7}),
        json!({"pm25": 10}),
    ] {
        let envelope = tools.dispatch("log", &args).await;
        assert_eq!(envelope["ok"], false, "accepted {args}");
        assert_eq!(envelope["error"]["code"], "validation_error");
    }

    assert_eq!(tools.store().count_observations().unwrap(), 0);
}

#[tokio::test]
async fn broken_database_is_a_storage_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sleep_data.db");
    let server = open_meteo().await;
    let tools = surface(Store::open(&db_path).unwrap(), &server);

    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute_batch("DROP TABLE sleep_logs;")
        .unwrap();

    for (name, args) in [
        ("summarize", json!({"days": 7})),
        ("log", json!({"pm25": 20, "sleep_duration_hours": 7})),
    ] {
        let envelope = tools.dispatch(name, &args).await;
        assert_eq!(envelope["ok"], false, "{name} succeeded on a dropped table");
        assert_eq!(envelope["error"]["code"], "storage_error");
        assert!(
            envelope["error"]["message"]
                .as_str()
                .unwrap()
                .contains("sleep_logs")
        );
    }
}

#[tokio::test]
async fn summary_defaults_and_edge_windows() {
    let server = open_meteo().await;
    let tools = surface(Store::open_in_memory().unwrap(), &server).with_defaults(DefaultsConfig {
        summary_days: 7,
        recent_count: 1,
    });

    for (pm25, hours) in [(10.0, 8.0), (20.0, 6.0)] {
        let envelope = tools
            .dispatch("log", &json!({"pm25": pm25, "sleep_duration_hours": hours}))
            .await;
        assert_eq!(envelope["ok"], true);
    }

    let summary = tools.dispatch("summarize", &Value::Null).await;
    assert_eq!(summary["result"]["count"], 2);
    assert_eq!(summary["result"]["avg_pm"], 15.0);
    assert_eq!(summary["result"]["avg_duration_hours"], 7.0);
    assert_eq!(summary["result"]["recent"].as_array().unwrap().len(), 1);

    let empty = tools
        .dispatch("summarize", &json!({"days": 0, "recent_count": 0}))
        .await;
    assert_eq!(empty["result"]["count"], 0);
    assert_eq!(empty["result"]["avg_pm"], 0.0);
    assert!(empty["result"]["recent"].as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_logging_shares_one_store() {
    let server = open_meteo().await;
    let tools = Arc::new(surface(Store::open_in_memory().unwrap(), &server));

    let mut handles = Vec::new();
    for i in 0..20 {
        let tools = Arc::clone(&tools);
        handles.push(tokio::spawn(async move {
            tools
                .dispatch("log", &json!({"pm25": i, "sleep_duration_hours": 7}))
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap()["ok"], true);
    }

    assert_eq!(tools.store().count_observations().unwrap(), 20);
}
