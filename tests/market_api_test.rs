use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use market_prices::market::MarketService;
use market_prices::server::create_server;
use market_prices::source::FsBulletinSource;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const EN_FIXTURE: &str = r#"<html><body><table>
    <tr><th colspan="5">Test Market</th></tr>
    <tr><th colspan="5">2024-03-01</th></tr>
    <tr><td>Tomato</td><td>kg</td><td>30</td><td>50</td><td>40</td></tr>
    <tr><td>short</td><td>row</td></tr>
    <tr><td>Apple</td><td>kg</td><td>150</td><td>200</td><td>175</td></tr>
</table></body></html>"#;

fn bulletin_dir() -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("en.html"), EN_FIXTURE).unwrap();
    dir
}

fn app(dir: &Path) -> Router {
    let service = MarketService::new(Arc::new(FsBulletinSource::new(dir)));
    create_server(Arc::new(service))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_prices_end_to_end() {
    let dir = bulletin_dir();
    let (status, body) = get(app(dir.path()), "/market/prices?lang=en").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], 1);
    assert_eq!(data[0]["name"], "Tomato");
    assert_eq!(data[0]["category"], "vegetables");
    assert_eq!(data[0]["avg"], 40.0);
    assert_eq!(data[1]["id"], 2);
    assert_eq!(data[1]["name"], "Apple");
    assert_eq!(data[1]["category"], "fruits");
    assert_eq!(data[1]["avg"], 175.0);

    let metadata = &body["metadata"];
    assert_eq!(metadata["subtitle"], "Test Market");
    assert_eq!(metadata["date"], "2024-03-01");
    assert_eq!(metadata["lang"], "en");
    assert_eq!(metadata["total"], 2);
    assert!(metadata["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_prices_sort_filter_and_limit_params() {
    let dir = bulletin_dir();

    let (_, body) = get(app(dir.path()), "/market/prices?sortBy=avg&sortOrder=desc").await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Apple", "Tomato"]);
    assert_eq!(body["metadata"]["sortBy"], "avg");
    assert_eq!(body["metadata"]["sortOrder"], "desc");

    let (_, body) = get(app(dir.path()), "/market/prices?category=Fruits").await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["category"], "fruits");

    let (_, body) = get(app(dir.path()), "/market/prices?limit=1").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = get(app(dir.path()), "/market/prices?limit=lots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_retail_and_wholesale_projections() {
    let dir = bulletin_dir();

    let (status, retail) = get(app(dir.path()), "/market/retail?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retail["data"][0]["price"], 40.0);
    assert_eq!(retail["data"][1]["price"], 175.0);
    assert_eq!(retail["metadata"]["priceType"], "retail");
    assert!(retail["data"][0].get("avg").is_none());

    let (status, wholesale) = get(app(dir.path()), "/market/wholesale?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let data = wholesale["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["price"], 30.0);
    assert_eq!(data[0]["unit"], "kg");
    assert_eq!(wholesale["metadata"]["priceType"], "wholesale");
}

#[tokio::test]
async fn test_categories() {
    let dir = bulletin_dir();
    let (status, body) = get(app(dir.path()), "/market/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!(["vegetables", "fruits"]));
    assert_eq!(body["metadata"]["total"], 2);
}

#[tokio::test]
async fn test_search() {
    let dir = bulletin_dir();
    let (status, body) = get(app(dir.path()), "/market/search?q=APP&lang=en").await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Apple");
    assert_eq!(body["metadata"]["query"], "APP");
    assert_eq!(body["metadata"]["total"], 1);
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let dir = bulletin_dir();

    for uri in ["/market/search", "/market/search?q=", "/market/search?q=%20%20"] {
        let (status, body) = get(app(dir.path()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Search query is required");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_missing_language_is_server_error() {
    let dir = bulletin_dir();

    for uri in [
        "/market/prices?lang=fr",
        "/market/retail?lang=fr",
        "/market/wholesale?lang=fr",
        "/market/search?q=tom&lang=fr",
    ] {
        let (status, body) = get(app(dir.path()), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Failed to"));
        assert!(body["error"].as_str().unwrap().contains("'fr'"));
    }
}

#[tokio::test]
async fn test_malformed_query_string_keeps_envelope() {
    let dir = bulletin_dir();

    for uri in [
        "/market/prices?lang=en&lang=en",
        "/market/retail?limit=1&limit=2",
        "/market/wholesale?lang=en&lang=np",
        "/market/search?q=tom&q=app",
    ] {
        let (status, body) = get(app(dir.path()), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to read query parameters");
        assert!(body["error"].as_str().unwrap().contains("duplicate field"), "{}", uri);
    }
}

#[tokio::test]
async fn test_categories_fail_without_default_bulletin() {
    let empty = tempdir().unwrap();
    let (status, body) = get(app(empty.path()), "/market/categories").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to fetch categories");
}

#[tokio::test]
async fn test_source_changes_are_picked_up_per_request() {
    let dir = bulletin_dir();
    let (_, before) = get(app(dir.path()), "/market/prices").await;
    assert_eq!(before["data"].as_array().unwrap().len(), 2);

    let updated = EN_FIXTURE.replace(
        "<tr><td>short</td><td>row</td></tr>",
        "<tr><td>Ginger</td><td>kg</td><td>100</td><td>140</td><td>120</td></tr>",
    );
    std::fs::write(dir.path().join("en.html"), updated).unwrap();

    let (_, after) = get(app(dir.path()), "/market/prices").await;
    let data = after["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[1]["name"], "Ginger");
    assert_eq!(data[1]["id"], 2);
    assert_eq!(data[2]["id"], 3);
}

#[tokio::test]
async fn test_health() {
    let dir = bulletin_dir();
    let (status, body) = get(app(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
