//! Common test utilities and fixtures.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use paulocell_core::config::AppConfig;
use paulocell_server::{AppState, create_router};
use tower::ServiceExt;

/// In-memory test server with the background sweeper disabled.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn new() -> Self {
        let config = AppConfig::for_testing();
        let store = paulocell_store::from_config(&config.store)
            .await
            .expect("Failed to create collection store");
        let state = AppState::new(config, store);
        let router = create_router(state.clone());
        Self { router, state }
    }
}

/// Issue a request against the router and decode the JSON body, if any.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, body_json)
}
