#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use solarfy_api::auth::jwt::JwtConfig;
use solarfy_api::config::{ServerConfig, StripeConfig};
use solarfy_api::router::build_app_router;
use solarfy_api::state::AppState;
use solarfy_core::project_image::DEFAULT_MAX_IMAGE_BYTES;
use solarfy_events::EventBus;

/// Webhook signing secret used by [`test_config`].
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Password used for every account the helpers create.
pub const TEST_PASSWORD: &str = "Sunshine-Roof-42";

const MULTIPART_BOUNDARY: &str = "solarfy-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Stripe is configured with a webhook secret only, so webhook tests work
/// without network access. Enphase is left unconfigured. Uploads go to a
/// fresh directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: std::env::temp_dir().join(format!("solarfy-test-{}", uuid::Uuid::new_v4())),
        max_upload_bytes: DEFAULT_MAX_IMAGE_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        stripe: Some(StripeConfig {
            secret_key: "sk_test_unused".to_string(),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
            starter_price_id: None,
            professional_price_id: None,
            enterprise_price_id: None,
            success_url: "http://localhost:3001/billing?success=1".to_string(),
            cancel_url: "http://localhost:3001/billing".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        }),
        enphase: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Uses the same builder as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), Arc::new(EventBus::default()));
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should be handled")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::PATCH, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// POST a single-file multipart form with the file under the `file` field.
pub async fn post_file_auth(
    app: Router,
    uri: &str,
    file_name: &str,
    content_type: &str,
    contents: &[u8],
    token: &str,
) -> Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .expect("request should build");
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// A company signed up through the API.
pub struct TestTenant {
    pub tenant_id: i64,
    pub admin_id: i64,
    pub admin_email: String,
    pub token: String,
    pub refresh_token: String,
}

/// Register a company with its first admin and return the admin's tokens.
pub async fn register_tenant(pool: &PgPool, company: &str, email: &str) -> TestTenant {
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({
        "company_name": company,
        "full_name": "Test Admin",
        "email": email,
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration should succeed");
    let json = body_json(response).await;
    let data = &json["data"];
    TestTenant {
        tenant_id: data["user"]["tenant_id"].as_i64().expect("tenant_id"),
        admin_id: data["user"]["id"].as_i64().expect("user id"),
        admin_email: email.to_string(),
        token: data["access_token"].as_str().expect("access_token").to_string(),
        refresh_token: data["refresh_token"].as_str().expect("refresh_token").to_string(),
    }
}

/// Have `tenant`'s admin create a user with `role`, then log them in.
/// Returns `(user_id, access_token)`.
pub async fn create_member(pool: &PgPool, tenant: &TestTenant, email: &str, role: &str) -> (i64, String) {
    let body = serde_json::json!({
        "email": email,
        "full_name": format!("Test {role}"),
        "password": TEST_PASSWORD,
        "role": role,
    });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        body,
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "user creation should succeed");
    let user_id = body_json(response).await["data"]["id"]
        .as_i64()
        .expect("user id");

    let token = login(pool, email, TEST_PASSWORD).await;
    (user_id, token)
}

/// Log in and return the access token.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    body_json(response).await["data"]["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

/// Create a lead through the API and return its JSON.
pub async fn create_lead(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/leads", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "lead creation should succeed");
    body_json(response).await["data"].clone()
}
