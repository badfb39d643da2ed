#![cfg(feature = "sqlite")]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

use product_api::api::handlers::AppStateInner;
use product_api::api::routes::create_router;
use product_api::db::{self, Repository};

// Helper to create a test app backed by a throwaway SQLite database
fn create_test_app(write_token: Option<&str>) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("products.db");

    let pool = db::sqlite::connection::create_pool(path.to_str().unwrap())
        .expect("Failed to create SQLite pool");
    let repository =
        Arc::new(db::SqliteRepository::new(pool).expect("Failed to initialize schema"))
            as Repository;

    let state = Arc::new(AppStateInner {
        repository,
        write_token: write_token.map(|token| token.to_string()),
    });

    (create_router(state), dir)
}

async fn send_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(json!({}));

    (status, json)
}

async fn send_json_request(app: &mut axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    send_request(app, method, uri, None, &[]).await
}

fn sample_payload() -> Value {
    json!({
        "name": "iPhone 13",
        "description": "Latest iPhone model with amazing features",
        "price": 999.99,
        "stock": 100
    })
}

async fn create_sample(app: &mut axum::Router) -> i64 {
    let (status, body) = send_request(app, "POST", "/products", Some(sample_payload()), &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().expect("created product id")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "product-api");
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn test_create_product() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) =
        send_request(&mut app, "POST", "/products", Some(sample_payload()), &[]).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["name"], "iPhone 13");
    assert_eq!(body["data"]["price"], 999.99);
    assert_eq!(body["data"]["status"], true);
    assert!(body["data"]["id"].as_i64().unwrap() > 0);
    // success envelope never carries an errors key
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_create_product_validation_failure() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_request(&mut app, "POST", "/products", Some(json!({})), &[]).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The request data was invalid");
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
    assert_eq!(body["errors"]["price"][0], "The price field is required.");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_list_products_pagination() {
    let (mut app, _dir) = create_test_app(None);
    for i in 0..15 {
        let mut payload = sample_payload();
        payload["name"] = json!(format!("Product {}", i));
        let (status, _) = send_request(&mut app, "POST", "/products", Some(payload), &[]).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) =
        send_json_request(&mut app, "GET", "/products?page=2&page_size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 15);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["page_size"], 10);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["has_more"], false);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_list_products_clamps_page_size() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) =
        send_json_request(&mut app, "GET", "/products?page_size=5000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page_size"], 100);
}

#[tokio::test]
async fn test_list_products_hostile_page_number() {
    let (mut app, _dir) = create_test_app(None);
    create_sample(&mut app).await;

    let (status, body) =
        send_json_request(&mut app, "GET", "/products?page=18446744073709551615").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["has_more"], false);
}

#[tokio::test]
async fn test_get_product() {
    let (mut app, _dir) = create_test_app(None);
    let id = create_sample(&mut app).await;

    let (status, body) = send_json_request(&mut app, "GET", &format!("/products/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "iPhone 13");
}

#[tokio::test]
async fn test_get_missing_product_is_classified() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_json_request(&mut app, "GET", "/products/9999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The requested product could not be found");
    assert!(body["errors"].is_null());
}

#[tokio::test]
async fn test_update_product_partial() {
    let (mut app, _dir) = create_test_app(None);
    let id = create_sample(&mut app).await;

    let (status, body) = send_request(
        &mut app,
        "PATCH",
        &format!("/products/{}", id),
        Some(json!({"price": 899.0, "stock": 50})),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["data"]["price"], 899.0);
    assert_eq!(body["data"]["stock"], 50);
    // untouched fields survive the patch
    assert_eq!(body["data"]["name"], "iPhone 13");
}

#[tokio::test]
async fn test_update_via_put_behaves_like_patch() {
    let (mut app, _dir) = create_test_app(None);
    let id = create_sample(&mut app).await;

    let (status, body) = send_request(
        &mut app,
        "PUT",
        &format!("/products/{}", id),
        Some(json!({"name": "iPhone 14"})),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "iPhone 14");
    assert_eq!(body["data"]["price"], 999.99);
}

#[tokio::test]
async fn test_update_missing_product() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_request(
        &mut app,
        "PUT",
        "/products/9999",
        Some(json!({"name": "Ghost"})),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The requested product could not be found");
}

#[tokio::test]
async fn test_update_validation_failure() {
    let (mut app, _dir) = create_test_app(None);
    let id = create_sample(&mut app).await;

    let (status, body) = send_request(
        &mut app,
        "PATCH",
        &format!("/products/{}", id),
        Some(json!({"price": -10.0})),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["price"][0], "The price field must be at least 0.");
}

#[tokio::test]
async fn test_delete_product_round_trip() {
    let (mut app, _dir) = create_test_app(None);
    let id = create_sample(&mut app).await;

    let (status, body) =
        send_json_request(&mut app, "DELETE", &format!("/products/{}", id)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    // the 204 envelope has no data/errors key at the application layer
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product deleted successfully");
    assert!(body.get("data").is_none());
    assert!(body.get("errors").is_none());

    let (status, _) = send_json_request(&mut app, "GET", &format!("/products/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_product() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_json_request(&mut app, "DELETE", "/products/9999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unmatched_route_is_enveloped() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_json_request(&mut app, "GET", "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The requested resource was not found");
}

#[tokio::test]
async fn test_method_not_allowed_is_enveloped() {
    let (mut app, _dir) = create_test_app(None);
    let (status, body) = send_json_request(&mut app, "DELETE", "/products").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "The requested method is not allowed for this resource"
    );
}

#[tokio::test]
async fn test_malformed_json_body_is_enveloped() {
    let (mut app, _dir) = create_test_app(None);

    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();
    assert!(status.is_client_error());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_non_json_caller_gets_plain_text() {
    let (mut app, _dir) = create_test_app(None);

    let request = Request::builder()
        .method("GET")
        .uri("/nope")
        .header("accept", "text/html")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&bytes),
        "The requested resource was not found"
    );
}

#[tokio::test]
async fn test_write_token_missing_credential() {
    let (mut app, _dir) = create_test_app(Some("sekret"));
    let (status, body) =
        send_request(&mut app, "POST", "/products", Some(sample_payload()), &[]).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Authentication is required to access this resource"
    );
}

#[tokio::test]
async fn test_write_token_wrong_credential() {
    let (mut app, _dir) = create_test_app(Some("sekret"));
    let (status, body) = send_request(
        &mut app,
        "POST",
        "/products",
        Some(sample_payload()),
        &[("authorization", "Bearer wrong")],
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "You do not have permission to access this resource"
    );
}

#[tokio::test]
async fn test_write_token_correct_credential() {
    let (mut app, _dir) = create_test_app(Some("sekret"));
    let (status, _) = send_request(
        &mut app,
        "POST",
        "/products",
        Some(sample_payload()),
        &[("authorization", "Bearer sekret")],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_write_token_does_not_gate_reads() {
    let (mut app, _dir) = create_test_app(Some("sekret"));
    let (status, _) = send_json_request(&mut app, "GET", "/products").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (mut app, _dir) = create_test_app(None);

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    // Check for Prometheus format metrics
    assert!(text.contains("# HELP"));
    assert!(text.contains("# TYPE"));
}
