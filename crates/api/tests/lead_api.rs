//! HTTP-level integration tests for leads, CSV import, the customer
//! journey, and project requests.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_lead, create_member, delete_auth, get_auth, post_file_auth,
    post_json_auth, put_json_auth, register_tenant,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Lead CRUD and classification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lead_classifies_by_email_domain(pool: PgPool) {
    let tenant = register_tenant(&pool, "Classify Co", "admin@classify.test").await;

    let owner = create_lead(
        &pool,
        &tenant.token,
        json!({ "name": "Jane Homeowner", "email": "Jane@Gmail.com", "state": "ca" }),
    )
    .await;
    assert_eq!(owner["customer_type"], "owner");
    assert_eq!(owner["email"], "jane@gmail.com");
    assert_eq!(owner["state"], "CA");
    assert_eq!(owner["status"], "new");
    assert_eq!(owner["source"], "manual");

    let lease = create_lead(
        &pool,
        &tenant.token,
        json!({ "name": "Dealer Contact", "email": "rep@enphase.com" }),
    )
    .await;
    assert_eq!(lease["customer_type"], "lease");
}

/// An explicit customer type wins over the email domain.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lead_explicit_customer_type(pool: PgPool) {
    let tenant = register_tenant(&pool, "Explicit Co", "admin@explicit.test").await;
    let lead = create_lead(
        &pool,
        &tenant.token,
        json!({ "name": "Leased Roof", "email": "someone@gmail.com", "customer_type": "lease" }),
    )
    .await;
    assert_eq!(lead["customer_type"], "lease");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lead_rejects_unknown_service(pool: PgPool) {
    let tenant = register_tenant(&pool, "Service Co", "admin@service.test").await;
    let body = json!({ "name": "Lead", "product_services": ["solar_panels", "hot_tub"] });
    let response = post_json_auth(build_test_app(pool), "/api/v1/leads", body, &tenant.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Status changes must follow the pipeline.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lead_status_transitions(pool: PgPool) {
    let tenant = register_tenant(&pool, "Pipeline Co", "admin@pipeline.test").await;
    let lead = create_lead(&pool, &tenant.token, json!({ "name": "Pipeline Lead" })).await;
    let uri = format!("/api/v1/leads/{}", lead["id"]);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "status": "won" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        &uri,
        json!({ "status": "contacted" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "contacted");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_leads_filters_and_search(pool: PgPool) {
    let tenant = register_tenant(&pool, "Search Co", "admin@search.test").await;
    create_lead(&pool, &tenant.token, json!({ "name": "Alice Sunny", "email": "alice@gmail.com" })).await;
    create_lead(&pool, &tenant.token, json!({ "name": "Bob Shade", "email": "bob@sunrun.com" })).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/leads?customer_type=lease",
        &tenant.token,
    )
    .await;
    let json = body_json(response).await;
    let leads = json["data"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["name"], "Bob Shade");

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/leads?q=alice", &tenant.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(build_test_app(pool), "/api/v1/leads?status=bogus", &tenant.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Sales rep visibility
// ---------------------------------------------------------------------------

/// Sales reps only see leads assigned to them; leads they create are theirs.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sales_rep_sees_only_own_leads(pool: PgPool) {
    let tenant = register_tenant(&pool, "Scope Co", "admin@scope.test").await;
    let (rep_id, rep_token) = create_member(&pool, &tenant, "rep@scope.test", "sales_rep").await;

    let admin_lead = create_lead(&pool, &tenant.token, json!({ "name": "Unassigned Lead" })).await;
    let rep_lead = create_lead(&pool, &rep_token, json!({ "name": "Rep Lead" })).await;
    assert_eq!(rep_lead["assigned_to"], rep_id);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/leads", &rep_token).await;
    let json = body_json(response).await;
    let leads = json["data"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["id"], rep_lead["id"]);

    let uri = format!("/api/v1/leads/{}", admin_lead["id"]);
    let response = get_auth(build_test_app(pool.clone()), &uri, &rep_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(build_test_app(pool), "/api/v1/leads", &tenant.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

/// Only managers and admins assign leads.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_lead(pool: PgPool) {
    let tenant = register_tenant(&pool, "Assign Co", "admin@assign.test").await;
    let (rep_id, rep_token) = create_member(&pool, &tenant, "rep@assign.test", "sales_rep").await;
    let lead = create_lead(&pool, &tenant.token, json!({ "name": "Hand Off" })).await;
    let uri = format!("/api/v1/leads/{}/assign", lead["id"]);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "user_id": rep_id }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assigned_to"], rep_id);

    let response = put_json_auth(
        build_test_app(pool),
        &uri,
        json!({ "user_id": null }),
        &rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

const IMPORT_CSV: &str = "\
Owner Name,Owner E-mail,Ref #
Jane Roof,jane@gmail.com,R-1
Bob Lease,bob@enphase.com,R-2
Carla Acme,carla@acme-industries.test,R-3
Jane Again,JANE@gmail.com,R-4
No Contact,,R-5
";

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_csv_classifies_and_reports(pool: PgPool) {
    let tenant = register_tenant(&pool, "Import Co", "admin@import.test").await;

    let response = post_file_auth(
        build_test_app(pool.clone()),
        "/api/v1/leads/import",
        "leads.csv",
        "text/csv",
        IMPORT_CSV.as_bytes(),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];

    assert_eq!(data["import"]["total_rows"], 5);
    assert_eq!(data["import"]["imported_count"], 3);
    assert_eq!(data["import"]["duplicate_count"], 1);
    assert_eq!(data["import"]["error_count"], 1);
    assert_eq!(data["customer_types"]["owner"], 2);
    assert_eq!(data["customer_types"]["lease"], 1);
    assert_eq!(data["classified_by_default"], 1);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/leads?customer_type=lease",
        &tenant.token,
    )
    .await;
    let json = body_json(response).await;
    let leads = json["data"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["source"], "csv_import");
    assert_eq!(leads[0]["reference"], "R-2");

    let response = get_auth(build_test_app(pool), "/api/v1/leads/imports", &tenant.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// Re-importing the same file imports nothing new.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reimport_skips_existing_emails(pool: PgPool) {
    let tenant = register_tenant(&pool, "Reimport Co", "admin@reimport.test").await;
    let csv = "Name,Email\nJane Roof,jane@gmail.com\n";

    for expected in [1, 0] {
        let response = post_file_auth(
            build_test_app(pool.clone()),
            "/api/v1/leads/import",
            "leads.csv",
            "text/csv",
            csv.as_bytes(),
            &tenant.token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["import"]["imported_count"], expected);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_without_name_column_fails(pool: PgPool) {
    let tenant = register_tenant(&pool, "Noname Co", "admin@noname.test").await;
    let response = post_file_auth(
        build_test_app(pool),
        "/api/v1/leads/import",
        "leads.csv",
        "text/csv",
        b"Email,Phone\njane@gmail.com,\n",
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Journey
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_journey_steps(pool: PgPool) {
    let tenant = register_tenant(&pool, "Journey Co", "admin@journey.test").await;
    let lead = create_lead(&pool, &tenant.token, json!({ "name": "Journey Lead" })).await;

    let uri = format!("/api/v1/leads/{}/journey", lead["id"]);
    let json = body_json(get_auth(build_test_app(pool.clone()), &uri, &tenant.token).await).await;
    assert_eq!(json["data"]["progress"], 0);
    assert_eq!(json["data"]["next_step"], "initial_contact");
    assert_eq!(json["data"]["steps"].as_array().unwrap().len(), 8);

    let step_uri = format!("{uri}/initial_contact");
    let response = put_json_auth(
        build_test_app(pool.clone()),
        &step_uri,
        json!({ "completed": true, "notes": "Called homeowner" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["steps"][0]["completed"], true);
    assert_eq!(json["data"]["steps"][0]["notes"], "Called homeowner");
    assert_eq!(json["data"]["next_step"], "site_survey");

    let response = put_json_auth(
        build_test_app(pool),
        &format!("{uri}/moon_landing"),
        json!({ "completed": true }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Project requests
// ---------------------------------------------------------------------------

/// A rep requests a project; a reviewer approves it, which creates the
/// project and wins the lead.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_request_approval(pool: PgPool) {
    let tenant = register_tenant(&pool, "Request Co", "admin@request.test").await;
    let (_rep_id, rep_token) = create_member(&pool, &tenant, "rep@request.test", "sales_rep").await;
    let lead = create_lead(
        &pool,
        &rep_token,
        json!({ "name": "Closing Lead", "address": "1 Sun St", "city": "Fresno", "state": "CA" }),
    )
    .await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/project-requests",
        json!({ "lead_id": lead["id"], "system_size_kw": 7.2 }),
        &rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request = body_json(response).await["data"].clone();
    assert_eq!(request["status"], "pending");
    let review_uri = format!("/api/v1/project-requests/{}/review", request["id"]);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &review_uri,
        json!({ "decision": "approve" }),
        &rep_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &review_uri,
        json!({ "decision": "approve" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["request"]["status"], "approved");
    assert_eq!(json["data"]["project"]["name"], "Closing Lead");
    assert_eq!(json["data"]["project"]["address"], "1 Sun St, Fresno, CA");

    let lead_uri = format!("/api/v1/leads/{}", lead["id"]);
    let json = body_json(get_auth(build_test_app(pool.clone()), &lead_uri, &tenant.token).await).await;
    assert_eq!(json["data"]["status"], "won");

    let response = post_json_auth(
        build_test_app(pool),
        &review_uri,
        json!({ "decision": "approve" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Deleting the lead after the request was filed leaves nothing to approve.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_request_for_deleted_lead_is_not_found(pool: PgPool) {
    let tenant = register_tenant(&pool, "Deleted Co", "admin@deleted.test").await;
    let lead = create_lead(&pool, &tenant.token, json!({ "name": "Vanishing Lead" })).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/project-requests",
        json!({ "lead_id": lead["id"] }),
        &tenant.token,
    )
    .await;
    let request = body_json(response).await["data"].clone();

    let lead_uri = format!("/api/v1/leads/{}", lead["id"]);
    let response = delete_auth(build_test_app(pool.clone()), &lead_uri, &tenant.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let review_uri = format!("/api/v1/project-requests/{}/review", request["id"]);
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &review_uri,
        json!({ "decision": "approve" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request_uri = format!("/api/v1/project-requests/{}", request["id"]);
    let json = body_json(get_auth(build_test_app(pool.clone()), &request_uri, &tenant.token).await).await;
    assert_eq!(json["data"]["status"], "pending");

    let json = body_json(get_auth(build_test_app(pool), "/api/v1/projects", &tenant.token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_request_rejection_needs_notes(pool: PgPool) {
    let tenant = register_tenant(&pool, "Reject Co", "admin@reject.test").await;
    let lead = create_lead(&pool, &tenant.token, json!({ "name": "Maybe Lead" })).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/project-requests",
        json!({ "lead_id": lead["id"] }),
        &tenant.token,
    )
    .await;
    let request = body_json(response).await["data"].clone();
    let review_uri = format!("/api/v1/project-requests/{}/review", request["id"]);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &review_uri,
        json!({ "decision": "reject" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool),
        &review_uri,
        json!({ "decision": "reject", "notes": "Roof too shaded" }),
        &tenant.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["request"]["status"], "rejected");
    assert!(json["data"]["project"].is_null());
}
