use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use pricehouse::config::Config;
use pricehouse::server::router::{PricehouseState, pricehouse_router};
use pricehouse::{PricePipeline, PriceStore};
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tower::ServiceExt;
use zip::ZipArchive;

const PRICES_URI: &str = "/api/v0/prices";
const BOUNDARY: &str = "pricehouse-test-boundary";

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "pricehouse-route-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn build_app(db_path: &Path, cfg: &mut Config) -> (Router, PriceStore) {
    cfg.database.database_url = format!("sqlite:{}", db_path.display());
    let store = PriceStore::connect(&cfg.database)
        .await
        .expect("store connect");
    let pipeline = PricePipeline::new(store.clone(), cfg.pipeline.archive_limits());
    let state = PricehouseState::new(pipeline, cfg.pipeline.max_upload_bytes);
    (pricehouse_router(state, cfg), store)
}

async fn remove_db(db_path: &Path) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    let _ = fs::remove_file(db_path).await;
}

fn price_archive(rows: &str) -> Vec<u8> {
    let csv = format!("id,name,category,price,create_date\n{rows}");
    pricehouse_codec::pack(csv.as_bytes()).expect("pack archive")
}

/// Hand-rolled multipart body with a single file part.
fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(PRICES_URI)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

async fn json_body(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not json")
}

#[tokio::test]
async fn upload_route_returns_stats_and_rejects_bad_uploads() {
    let db_path = temp_db_path("upload");
    let mut cfg = Config::default();
    let (app, store) = build_app(&db_path, &mut cfg).await;

    // 1) valid archive -> 200 with stats
    let archive = price_archive("1,Widget,Tools,9.99,2024-01-01\n2,Ball,Toys,0.01,2024-01-02\n");
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "prices.zip", &archive)))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let stats = json_body(resp).await;
    assert_eq!(stats["total_items"], 2);
    assert_eq!(stats["total_categories"], 2);
    assert!((stats["total_price"].as_f64().unwrap() - 10.0).abs() < 1e-9);

    // 2) malformed row -> 400 VALIDATION, nothing committed
    let archive = price_archive("1,Widget,Tools,abc,2024-01-01\n");
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "bad.zip", &archive)))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
    assert!(
        body["error"]["message"].as_str().unwrap().contains("line 2"),
        "got: {body}"
    );

    // 3) multipart without a `file` field -> 400 BAD_UPLOAD
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("attachment", "prices.zip", &archive)))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "BAD_UPLOAD");

    // 4) not multipart at all -> 400
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PRICES_URI)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 5) not a zip -> 400 ARCHIVE_FORMAT
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "x.zip", b"plain text")))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "ARCHIVE_FORMAT");

    // Only the first upload landed.
    assert_eq!(store.fetch_all().await.unwrap().len(), 2);

    store.close().await;
    remove_db(&db_path).await;
}

#[tokio::test]
async fn export_route_serves_zip_attachment() {
    let db_path = temp_db_path("export");
    let mut cfg = Config::default();
    let (app, store) = build_app(&db_path, &mut cfg).await;

    let archive = price_archive("1,Widget,Tools,9.99,2024-01-01\n");
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "prices.zip", &archive)))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(PRICES_URI)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=data.zip"
    );
    let declared_len: usize = resp.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    assert_eq!(body.len(), declared_len);

    let mut zip = ZipArchive::new(Cursor::new(body.to_vec())).expect("valid zip");
    let mut entry = zip.by_name("data.csv").expect("data.csv entry");
    let mut csv = String::new();
    entry.read_to_string(&mut csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("id,name,category,price,create_date"));
    let row = lines.next().expect("one row");
    assert!(
        row.ends_with(",Widget,Tools,9.99,2024-01-01 00:00:00"),
        "got: {row}"
    );

    store.close().await;
    remove_db(&db_path).await;
}

#[tokio::test]
async fn wrong_method_and_unknown_path_are_rejected() {
    let db_path = temp_db_path("methods");
    let mut cfg = Config::default();
    let (app, store) = build_app(&db_path, &mut cfg).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(PRICES_URI)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v0/other")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    store.close().await;
    remove_db(&db_path).await;
}

#[tokio::test]
async fn upload_over_body_limit_is_413() {
    let db_path = temp_db_path("limit");
    let mut cfg = Config::default();
    cfg.pipeline.max_upload_bytes = 1024;
    let (app, store) = build_app(&db_path, &mut cfg).await;

    let oversized = vec![b'x'; 4096];
    let resp = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "big.zip", &oversized)))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(resp).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(store.fetch_all().await.unwrap().is_empty());

    store.close().await;
    remove_db(&db_path).await;
}
