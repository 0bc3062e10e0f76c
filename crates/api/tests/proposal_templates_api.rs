//! HTTP-level integration tests for the `/proposal-templates` endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json, quote_config};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/proposal-templates", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn create_quote(pool: &PgPool, slug: &str) -> i64 {
    let data = create(
        pool,
        json!({ "name": "Event Quote", "slug": slug, "config_json": quote_config() }),
    )
    .await;
    data["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Test: create with no config starts from an empty document
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_template_defaults(pool: PgPool) {
    let data = create(&pool, json!({ "name": "Gala", "slug": "gala" })).await;

    assert_eq!(data["name"], "Gala");
    assert_eq!(data["config_json"]["elements"], json!([]));
    assert_eq!(data["config_json"]["theme_config"], json!({}));
    assert!(data["published_at"].is_null());
    assert_eq!(data["coverage_warnings"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: config is normalized, camelCase keys preserved
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_template_normalizes_config(pool: PgPool) {
    let id = create_quote(&pool, "event-quote").await;

    let response = get(build_test_app(pool), &format!("/api/v1/proposal-templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let elements = json["data"]["config_json"]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[1]["type"], "pricing_tiers");
    assert_eq!(elements[1]["config"]["basedOn"], "quantity");
    assert_eq!(elements[1]["config"]["tiers"][0]["pricePerUnit"], 100.0);
}

// ---------------------------------------------------------------------------
// Test: validation failures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_bad_slug_per_field(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/proposal-templates",
        json!({ "name": "Gala", "slug": "Spring Gala" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FIELD_VALIDATION_ERROR");
    assert_eq!(json["fields"][0]["field"], "slug");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_unknown_element_type(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/proposal-templates",
        json!({
            "name": "Gala",
            "slug": "gala",
            "config_json": {
                "elements": [{ "id": "x", "type": "carousel", "order": 0, "config": {} }]
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_ELEMENT_TYPE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_dangling_pricing_reference(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/proposal-templates",
        json!({
            "name": "Gala",
            "slug": "gala",
            "config_json": {
                "elements": [{
                    "id": "pricing_tiers-1",
                    "type": "pricing_tiers",
                    "order": 0,
                    "config": { "basedOn": "guests" }
                }]
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DANGLING_REFERENCE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_duplicate_slug_conflicts(pool: PgPool) {
    create(&pool, json!({ "name": "Gala", "slug": "gala" })).await;

    let response = post_json(
        build_test_app(pool),
        "/api/v1/proposal-templates",
        json!({ "name": "Gala 2", "slug": "gala" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: element type palette
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_element_types(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/proposal-templates/element-types").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let types = json["data"].as_array().unwrap();
    assert_eq!(types.len(), 17);

    let tiers = types
        .iter()
        .find(|t| t["type"] == "pricing_tiers")
        .expect("pricing_tiers should be in the palette");
    assert_eq!(tiers["category"], "pricing");
    assert_eq!(tiers["default_config"]["tiers"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Test: update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_reports_coverage_gaps(pool: PgPool) {
    let id = create_quote(&pool, "event-quote").await;

    let mut config = quote_config();
    config["elements"][1]["config"]["tiers"] = json!([
        { "label": "1-10", "minQty": 1, "maxQty": 10, "pricePerUnit": 100 }
    ]);

    let response = put_json(
        build_test_app(pool),
        &format!("/api/v1/proposal-templates/{id}"),
        json!({ "name": "Renamed", "config_json": config }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed");
    assert_eq!(json["data"]["slug"], "event-quote");
    let warnings = json["data"]["coverage_warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["from"], 11);
    assert_eq!(warnings[0]["to"], 200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_returns_404(pool: PgPool) {
    let response = put_json(
        build_test_app(pool),
        "/api/v1/proposal-templates/999999",
        json!({ "name": "Nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_taken_slug_conflicts(pool: PgPool) {
    create(&pool, json!({ "name": "Gala", "slug": "gala" })).await;
    let other = create(&pool, json!({ "name": "Other", "slug": "other" })).await;

    let response = put_json(
        build_test_app(pool),
        &format!("/api/v1/proposal-templates/{}", other["id"]),
        json!({ "slug": "gala" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_templates_with_filters(pool: PgPool) {
    create(
        &pool,
        json!({ "name": "Wedding Film", "slug": "wedding-film", "service_type": "video" }),
    )
    .await;
    create(
        &pool,
        json!({ "name": "Recital Photos", "slug": "recital-photos", "service_type": "photo" }),
    )
    .await;

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/proposal-templates").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["submission_count"], 0);

    let json = body_json(
        get(build_test_app(pool.clone()), "/api/v1/proposal-templates?search=wedding").await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["slug"], "wedding-film");

    let json = body_json(
        get(build_test_app(pool), "/api/v1/proposal-templates?service_type=photo&limit=10").await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["slug"], "recital-photos");
}

// ---------------------------------------------------------------------------
// Test: publish
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_returns_preview_url(pool: PgPool) {
    let id = create_quote(&pool, "event-quote").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/proposal-templates/{id}/publish"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["published_url"],
        "https://proposals.example.com/proposals/preview/event-quote"
    );

    let json = body_json(
        get(build_test_app(pool), &format!("/api/v1/proposal-templates/{id}")).await,
    )
    .await;
    assert!(json["data"]["published_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_without_elements_is_rejected(pool: PgPool) {
    let data = create(&pool, json!({ "name": "Empty", "slug": "empty" })).await;

    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/proposal-templates/{}/publish", data["id"]),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_nonexistent_returns_404(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/proposal-templates/999999/publish",
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: duplicate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_template(pool: PgPool) {
    let id = create_quote(&pool, "event-quote").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/proposal-templates/{id}/duplicate"),
        json!({ "new_name": "Event Quote (Copy)", "new_slug": "event-quote-copy" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_ne!(json["data"]["id"], id);
    assert_eq!(json["data"]["slug"], "event-quote-copy");
    assert_eq!(json["data"]["config_json"]["elements"].as_array().unwrap().len(), 3);

    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/proposal-templates/{id}/duplicate"),
        json!({ "new_name": "Again", "new_slug": "event-quote-copy" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_template(pool: PgPool) {
    let data = create(&pool, json!({ "name": "Gala", "slug": "gala" })).await;
    let uri = format!("/api/v1/proposal-templates/{}", data["id"]);

    let response = delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_with_submissions_conflicts(pool: PgPool) {
    let id = create_quote(&pool, "event-quote").await;
    post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/proposal-templates/{id}/publish"),
        json!({}),
    )
    .await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/public/proposals/event-quote/submissions",
        json!({ "values": { "quantity": 5 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete(
        build_test_app(pool.clone()),
        &format!("/api/v1/proposal-templates/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(
        get(
            build_test_app(pool),
            &format!("/api/v1/proposal-templates/{id}/submissions"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
