//! End-to-end API tests over the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{TestServer, json_request};
use serde_json::json;

#[tokio::test]
async fn status_reports_ok() {
    let server = TestServer::new().await;
    let (status, body) = json_request(&server.router, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_assigns_id_when_missing() {
    let server = TestServer::new().await;
    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"name": "Alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["name"], "Alice");

    let (status, list) = json_request(&server.router, "GET", "/api/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn crud_round_trip() {
    let server = TestServer::new().await;
    json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;

    let (status, body) = json_request(&server.router, "GET", "/api/customers/cust-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");

    let (status, body) = json_request(
        &server.router,
        "PUT",
        "/api/customers/cust-1",
        Some(json!({"name": "Alice Cooper"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "cust-1");
    assert_eq!(body["name"], "Alice Cooper");

    let (status, _) = json_request(&server.router, "GET", "/api/customers/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_kind_is_not_found() {
    let server = TestServer::new().await;
    let (status, body) = json_request(&server.router, "GET", "/api/invoices", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn malformed_record_is_rejected() {
    let server = TestServer::new().await;
    // Devices require an owner.
    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/devices",
        Some(json!({"model": "iPhone 12"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_cascades_into_trash() {
    let server = TestServer::new().await;
    json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;
    json_request(
        &server.router,
        "POST",
        "/api/devices",
        Some(json!({"id": "dev-1", "owner": "cust-1", "model": "iPhone 12"})),
    )
    .await;
    json_request(
        &server.router,
        "POST",
        "/api/services",
        Some(json!({"id": "svc-1", "customerId": "cust-1", "deviceId": "dev-1"})),
    )
    .await;

    let (status, _) = json_request(&server.router, "DELETE", "/api/customers/cust-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, active) = json_request(&server.router, "GET", "/api/devices", None).await;
    assert!(active.as_array().unwrap().is_empty());

    let (status, trash) = json_request(&server.router, "GET", "/api/trash/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    let tombstone = &trash.as_array().unwrap()[0];
    assert_eq!(tombstone["id"], "dev-1");
    assert_eq!(tombstone["deletedWithCustomer"], "cust-1");
    assert!(tombstone["deletedAt"].as_str().is_some());

    let (status, _) = json_request(&server.router, "DELETE", "/api/customers/cust-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restore_returns_family_to_active() {
    let server = TestServer::new().await;
    json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;
    json_request(
        &server.router,
        "POST",
        "/api/devices",
        Some(json!({"id": "dev-1", "owner": "cust-1"})),
    )
    .await;
    json_request(&server.router, "DELETE", "/api/customers/cust-1", None).await;

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/trash/customers/cust-1/restore",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, devices) = json_request(&server.router, "GET", "/api/devices", None).await;
    let device = &devices.as_array().unwrap()[0];
    assert_eq!(device["id"], "dev-1");
    assert!(device.get("deletedAt").is_none());

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/trash/customers/cust-1/restore",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn purge_removes_tombstones_for_good() {
    let server = TestServer::new().await;
    json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;
    json_request(&server.router, "DELETE", "/api/customers/cust-1", None).await;

    let (status, _) =
        json_request(&server.router, "DELETE", "/api/trash/customers/cust-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, trash) = json_request(&server.router, "GET", "/api/trash/customers", None).await;
    assert!(trash.as_array().unwrap().is_empty());

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/trash/customers/cust-1/restore",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cleanup_reports_purge_counts() {
    let server = TestServer::new().await;
    json_request(
        &server.router,
        "POST",
        "/api/customers",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;
    json_request(&server.router, "DELETE", "/api/customers/cust-1", None).await;

    // Freshly deleted, well inside the retention window.
    let (status, body) = json_request(&server.router, "POST", "/api/trash/cleanup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["customers"], 0);
}

#[tokio::test]
async fn singular_kind_names_are_accepted() {
    let server = TestServer::new().await;
    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/customer",
        Some(json!({"id": "cust-1", "name": "Alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = json_request(&server.router, "GET", "/api/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}
