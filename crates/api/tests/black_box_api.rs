use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::{json, Value};

use stockpulse_api::app::{build_app, AppServices};
use stockpulse_core::BranchCode;
use stockpulse_infra::provider::InMemorySkuFactsProvider;
use stockpulse_infra::{AppendOutcome, PersistenceError, PipelineConfig, RetryPolicy, SnapshotRecord, SnapshotStore};
use stockpulse_replenishment::{RawSkuFacts, ReplenishmentConfig};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn branch(code: &str) -> BranchCode {
    BranchCode::new(code).unwrap()
}

fn facts(branch: &str, sku: &str, on_hand: i64, brand: &str) -> RawSkuFacts {
    RawSkuFacts {
        branch_code: Some(branch.into()),
        sku_number: Some(sku.into()),
        product_name: Some(format!("{sku} product")),
        brand_name: Some(brand.into()),
        on_hand_qty: Some(json!(on_hand)),
        sales6: Some(json!([4, 6, 5, 7, 6, 8])),
        frequency: Some(json!(6)),
        ..Default::default()
    }
}

fn seeded_services() -> AppServices {
    let provider = InMemorySkuFactsProvider::new()
        .with_branch(branch("00TR"), vec![facts("00TR", "A100", 40, "Acme"), facts("00TR", "B200", 5, "Bolt")])
        .with_branch(branch("05AY"), vec![facts("05AY", "C300", 12, "Core")]);

    let pipeline = PipelineConfig {
        branches: vec![branch("05AY"), branch("00TR"), branch("01TJ")],
        retry: RetryPolicy::no_retry(),
        ..PipelineConfig::default()
    };

    AppServices::in_memory(provider, ReplenishmentConfig::default(), pipeline)
}

fn row_keys(body: &Value) -> Vec<String> {
    body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| format!("{}/{}", r["branchCode"].as_str().unwrap(), r["skuNumber"].as_str().unwrap()))
        .collect()
}

async fn get_json(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(seeded_services()).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn generated_snapshots_are_served_in_branch_order() {
    let srv = TestServer::spawn(seeded_services()).await;
    let client = reqwest::Client::new();

    // Nothing stored yet.
    let (status, body) = get_json(&client, format!("{}/api/stock-status", srv.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let res = client
        .post(format!("{}/api/stock-status/snapshots", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();

    let outcomes: Vec<(&str, &str)> = report["branches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| (b["branchCode"].as_str().unwrap(), b["outcome"].as_str().unwrap()))
        .collect();
    assert_eq!(outcomes, vec![("05AY", "written"), ("00TR", "written"), ("01TJ", "skipped")]);
    assert_eq!(report["branches"][1]["rows"], 2);

    let (status, latest) = get_json(&client, format!("{}/api/stock-status", srv.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["count"], 3);
    assert_eq!(row_keys(&latest), vec!["00TR/A100", "00TR/B200", "05AY/C300"]);

    // Same rows when asking for the run's date explicitly.
    let date = report["snapshotDate"].as_str().unwrap();
    let (status, dated) = get_json(&client, format!("{}/api/stock-status?date={date}", srv.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dated, latest);

    // A second run the same day writes nothing new.
    let rerun: Value = client
        .post(format!("{}/api/stock-status/snapshots", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rerun["branches"][1]["outcome"], "skipped");
    assert_eq!(rerun["branches"][1]["reason"], "alreadyWritten");
    let (_, again) = get_json(&client, format!("{}/api/stock-status", srv.base_url)).await;
    assert_eq!(again["count"], 3);
}

#[tokio::test]
async fn sort_parameters_reorder_rows() {
    let srv = TestServer::spawn(seeded_services()).await;
    let client = reqwest::Client::new();
    client
        .post(format!("{}/api/stock-status/snapshots", srv.base_url))
        .send()
        .await
        .unwrap();

    let (_, body) = get_json(
        &client,
        format!("{}/api/stock-status?sortBy=onHandQty&order=desc", srv.base_url),
    )
    .await;
    assert_eq!(row_keys(&body), vec!["00TR/A100", "05AY/C300", "00TR/B200"]);

    let (_, body) = get_json(&client, format!("{}/api/stock-status?sortBy=brand", srv.base_url)).await;
    assert_eq!(row_keys(&body), vec!["00TR/A100", "00TR/B200", "05AY/C300"]);

    // Unknown columns leave the branch order untouched.
    let (status, body) = get_json(&client, format!("{}/api/stock-status?sortBy=colour&order=desc", srv.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_keys(&body), vec!["00TR/A100", "00TR/B200", "05AY/C300"]);
}

#[tokio::test]
async fn unknown_date_is_empty_and_bad_date_is_rejected() {
    let srv = TestServer::spawn(seeded_services()).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, format!("{}/api/stock-status?date=2001-01-01", srv.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 0, "rows": [] }));

    let (status, body) = get_json(&client, format!("{}/api/stock-status?date=01/02/2025", srv.base_url)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_date");
}

struct UnavailableStore;

#[async_trait]
impl SnapshotStore for UnavailableStore {
    async fn append(&self, _record: SnapshotRecord) -> Result<AppendOutcome, PersistenceError> {
        Err(PersistenceError::Unavailable("down".into()))
    }

    async fn by_date(&self, _date: NaiveDate) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        Err(PersistenceError::Unavailable("down".into()))
    }

    async fn latest_per_branch(&self) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        Err(PersistenceError::Unavailable("down".into()))
    }
}

#[tokio::test]
async fn store_failures_map_to_server_errors() {
    let provider = InMemorySkuFactsProvider::new().with_branch(branch("00TR"), vec![facts("00TR", "A100", 1, "Acme")]);
    let pipeline = PipelineConfig {
        branches: vec![branch("00TR")],
        retry: RetryPolicy::no_retry(),
        ..PipelineConfig::default()
    };
    let services = AppServices::new(
        Arc::new(provider),
        Arc::new(UnavailableStore),
        ReplenishmentConfig::default(),
        pipeline,
    );
    let srv = TestServer::spawn(services).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, format!("{}/api/stock-status", srv.base_url)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store_error");

    // The run itself still answers; the branch is reported as failed.
    let res = client
        .post(format!("{}/api/stock-status/snapshots", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["branches"][0]["outcome"], "failed");
    assert_eq!(report["branches"][0]["attempts"], 1);
}
