//! Integration tests for subscriptions: plan catalogue, the trial write
//! lock, and Stripe webhooks.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use common::{
    body_json, build_test_app, create_lead, get, get_auth, post_json_auth, register_tenant,
    TEST_WEBHOOK_SECRET,
};
use serde_json::json;
use solarfy_core::billing::compute_stripe_signature;
use sqlx::PgPool;
use tower::ServiceExt;

async fn post_webhook(app: Router, payload: &[u8], signature: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/billing/webhook")
        .header(CONTENT_TYPE, "application/json")
        .header("stripe-signature", signature)
        .body(Body::from(payload.to_vec()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

fn sign(payload: &[u8]) -> String {
    let now = chrono::Utc::now().timestamp();
    let v1 = compute_stripe_signature(TEST_WEBHOOK_SECRET, now, payload);
    format!("t={now},v1={v1}")
}

async fn expire_trial(pool: &PgPool, tenant_id: i64) {
    sqlx::query(
        "UPDATE subscriptions SET trial_ends_at = NOW() - INTERVAL '1 day' WHERE tenant_id = $1",
    )
    .bind(tenant_id)
    .execute(pool)
    .await
    .unwrap();
}

/// The pricing page reads the catalogue before anyone signs up.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plan_catalogue_is_public(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/billing/plans").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let plans = json["data"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
}

/// An expired trial blocks writes but support stays reachable.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_trial_is_read_only(pool: PgPool) {
    let tenant = register_tenant(&pool, "Expired Co", "admin@expired.test").await;
    create_lead(&pool, &tenant.token, json!({ "name": "Before Expiry" })).await;
    expire_trial(&pool, tenant.tenant_id).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/leads",
        json!({ "name": "After Expiry" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/leads", &tenant.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/tickets",
        json!({ "subject": "Billing help", "description": "Our trial ended" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(build_test_app(pool), "/api/v1/billing/subscription", &tenant.token).await;
    assert_eq!(body_json(response).await["data"]["writable"], false);
}

/// Checkout completion activates the paid plan and unlocks writes.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checkout_webhook_activates_subscription(pool: PgPool) {
    let tenant = register_tenant(&pool, "Paying Co", "admin@paying.test").await;
    expire_trial(&pool, tenant.tenant_id).await;

    let payload = json!({
        "id": "evt_checkout",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "client_reference_id": tenant.tenant_id.to_string(),
            "customer": "cus_123",
            "subscription": "sub_123",
            "metadata": { "plan": "professional" },
        }},
    })
    .to_string();

    let response = post_webhook(
        build_test_app(pool.clone()),
        payload.as_bytes(),
        &sign(payload.as_bytes()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["received"], true);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/billing/subscription",
        &tenant.token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["subscription"]["plan"], "professional");
    assert_eq!(json["data"]["subscription"]["status"], "active");
    assert_eq!(json["data"]["writable"], true);

    // A later cancellation arrives keyed by the Stripe subscription id.
    let payload = json!({
        "id": "evt_cancel",
        "type": "customer.subscription.deleted",
        "data": { "object": { "id": "sub_123", "status": "canceled" } },
    })
    .to_string();
    let response = post_webhook(
        build_test_app(pool.clone()),
        payload.as_bytes(),
        &sign(payload.as_bytes()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), "/api/v1/billing/subscription", &tenant.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["subscription"]["status"], "canceled");
    assert_eq!(json["data"]["writable"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_rejects_bad_signature(pool: PgPool) {
    let payload = br#"{"id":"evt_1","type":"invoice.payment_failed","data":{"object":{}}}"#;
    let now = chrono::Utc::now().timestamp();
    let forged = compute_stripe_signature("whsec_wrong", now, payload);

    let response = post_webhook(
        build_test_app(pool.clone()),
        payload,
        &format!("t={now},v1={forged}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_webhook(build_test_app(pool), payload, "garbage").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Unknown event types are acknowledged without side effects.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_ignores_unhandled_events(pool: PgPool) {
    let payload = br#"{"id":"evt_2","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let response = post_webhook(build_test_app(pool), payload, &sign(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
