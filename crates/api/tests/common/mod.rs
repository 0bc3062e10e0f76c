#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use commandcentered_api::config::ServerConfig;
use commandcentered_api::router::build_app_router;
use commandcentered_api::state::AppState;

pub const PUBLIC_BASE_URL: &str = "https://proposals.example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        public_base_url: PUBLIC_BASE_URL.to_string(),
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// A number input bound to `quantity` and a three-band tier table over it.
pub fn quote_config() -> serde_json::Value {
    serde_json::json!({
        "elements": [
            {
                "id": "number_input-guests",
                "type": "number_input",
                "order": 0,
                "config": {
                    "label": "Guests",
                    "min": 1,
                    "max": 200,
                    "required": true,
                    "pricingVariable": "quantity"
                }
            },
            {
                "id": "pricing_tiers-guests",
                "type": "pricing_tiers",
                "order": 1,
                "config": {
                    "label": "Per guest",
                    "basedOn": "quantity",
                    "tiers": [
                        { "label": "1-10", "minQty": 1, "maxQty": 10, "pricePerUnit": 100 },
                        { "label": "11-50", "minQty": 11, "maxQty": 50, "pricePerUnit": 90 },
                        { "label": "51+", "minQty": 51, "maxQty": null, "pricePerUnit": 80 }
                    ]
                }
            },
            {
                "id": "service_toggles-extras",
                "type": "service_toggles",
                "order": 2,
                "config": {
                    "label": "Extras",
                    "services": [
                        { "id": "drone", "name": "Drone footage", "basePrice": 500 }
                    ]
                }
            }
        ],
        "theme_config": {}
    })
}
