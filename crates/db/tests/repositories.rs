//! Integration tests for the repository layer against a real database.
//!
//! Covers tenant sign-up, tenant scoping of lead reads, CSV import
//! persistence, journey upserts, and the project request approval
//! transaction.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use solarfy_core::csv_import::RowError;
use solarfy_core::roles::{ROLE_ADMIN, ROLE_SALES_REP};
use solarfy_db::models::lead::{CreateLead, ImportedLead, LeadListParams};
use solarfy_db::models::lead_import::CreateLeadImport;
use solarfy_db::models::project::CreateProject;
use solarfy_db::models::project_request::CreateProjectRequest;
use solarfy_db::models::user::CreateUser;
use solarfy_db::repositories::project_request_repo::Approval;
use solarfy_db::repositories::tenant_repo::RegisteredTenant;
use solarfy_db::repositories::{
    JourneyRepo, LeadImportRepo, LeadRepo, ProjectRequestRepo, RoleRepo, TenantRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn register(pool: &PgPool, slug: &str) -> RegisteredTenant {
    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN).await.unwrap().unwrap();
    let admin = CreateUser {
        tenant_id: 0,
        email: format!("admin@{slug}.test"),
        full_name: "Admin".into(),
        password_hash: "not-a-real-hash".into(),
        role_id: role.id,
    };
    TenantRepo::register(pool, slug, slug, &admin, "starter", Utc::now() + Duration::days(14))
        .await
        .unwrap()
}

fn lead(name: &str, email: &str) -> CreateLead {
    CreateLead {
        name: name.into(),
        email: Some(email.into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Tenancy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_tenant_admin_and_trial(pool: PgPool) {
    let reg = register(&pool, "acme").await;
    assert_eq!(reg.admin.tenant_id, reg.tenant.id);
    assert_eq!(reg.subscription.status, "trialing");
    assert_eq!(reg.subscription.plan, "starter");
    assert!(reg.subscription.trial_ends_at.is_some());
    assert!(TenantRepo::slug_exists(&pool, "acme").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_slug_is_a_unique_violation(pool: PgPool) {
    register(&pool, "acme").await;
    let role = RoleRepo::find_by_name(&pool, ROLE_ADMIN).await.unwrap().unwrap();
    let admin = CreateUser {
        tenant_id: 0,
        email: "other@acme.test".into(),
        full_name: "Other".into(),
        password_hash: "x".into(),
        role_id: role.id,
    };
    let err = TenantRepo::register(&pool, "Acme", "acme", &admin, "starter", Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_tenants_slug"));

    // The failed transaction left no user behind.
    assert!(UserRepo::find_by_email(&pool, "other@acme.test").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leads_are_invisible_across_tenants(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let b = register(&pool, "tenant-b").await;

    let created = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();

    assert!(LeadRepo::find_by_id(&pool, a.tenant.id, created.id).await.unwrap().is_some());
    assert!(LeadRepo::find_by_id(&pool, b.tenant.id, created.id).await.unwrap().is_none());
    assert!(!LeadRepo::soft_delete(&pool, b.tenant.id, created.id).await.unwrap());

    let listed_b = LeadRepo::list_filtered(
        &pool,
        b.tenant.id,
        &LeadListParams::default(),
        None,
        None,
        25,
        0,
    )
    .await
    .unwrap();
    assert!(listed_b.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lead_email_is_unique_per_tenant_only(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let b = register(&pool, "tenant-b").await;

    LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();
    LeadRepo::create(&pool, b.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();

    let err = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Dup", "JANE@gmail.com"))
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_leads_tenant_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_leads_free_their_email(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let first = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();
    assert!(LeadRepo::soft_delete(&pool, a.tenant.id, first.id).await.unwrap());
    assert!(LeadRepo::find_by_id(&pool, a.tenant.id, first.id).await.unwrap().is_none());

    LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane 2", "jane@gmail.com"))
        .await
        .unwrap();
    assert_eq!(LeadRepo::count_for_tenant(&pool, a.tenant.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_search_and_assignee(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let rep_role = RoleRepo::find_by_name(&pool, ROLE_SALES_REP).await.unwrap().unwrap();
    let rep = UserRepo::create(
        &pool,
        &CreateUser {
            tenant_id: a.tenant.id,
            email: "rep@tenant-a.test".into(),
            full_name: "Rep".into(),
            password_hash: "x".into(),
            role_id: rep_role.id,
        },
    )
    .await
    .unwrap();

    let jane = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane Smith", "js@gmail.com"))
        .await
        .unwrap();
    LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Bob Jones", "bob@gmail.com"))
        .await
        .unwrap();
    LeadRepo::assign(&pool, a.tenant.id, jane.id, Some(rep.id)).await.unwrap();

    let params = LeadListParams::default();
    let found = LeadRepo::list_filtered(&pool, a.tenant.id, &params, Some("%smith%"), None, 25, 0)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, jane.id);

    let mine = LeadRepo::list_filtered(&pool, a.tenant.id, &params, None, Some(rep.id), 25, 0)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].assigned_to, Some(rep.id));
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_inserts_leads_and_audit_record(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Existing", "taken@gmail.com"))
        .await
        .unwrap();

    let leads = vec![
        ImportedLead {
            line: 2,
            name: "Owner".into(),
            email: Some("owner@gmail.com".into()),
            phone: None,
            reference: Some("R-1".into()),
            customer_type: Some("owner".into()),
            assigned_to: None,
        },
        ImportedLead {
            line: 3,
            name: "Lease".into(),
            email: Some("lease@enphase.com".into()),
            phone: Some("5552345678".into()),
            reference: None,
            customer_type: Some("lease".into()),
            assigned_to: None,
        },
        // Claimed after planning; must be skipped, not fail the batch.
        ImportedLead {
            line: 4,
            name: "Raced".into(),
            email: Some("taken@gmail.com".into()),
            phone: None,
            reference: None,
            customer_type: Some("owner".into()),
            assigned_to: None,
        },
    ];
    let outcome = LeadImportRepo::import(
        &pool,
        &CreateLeadImport {
            tenant_id: a.tenant.id,
            imported_by: a.admin.id,
            file_name: "leads.csv".into(),
            total_rows: 4,
            imported_count: 3,
            duplicate_count: 0,
            error_count: 1,
            errors: vec![RowError {
                line: 5,
                message: "Name is required".into(),
            }],
        },
        &leads,
    )
    .await
    .unwrap();

    let record = &outcome.import;
    assert_eq!(record.imported_count, 2);
    assert_eq!(record.duplicate_count, 1);
    assert_eq!(record.error_count, 1);
    assert_eq!(LeadRepo::count_for_tenant(&pool, a.tenant.id).await.unwrap(), 3);

    // The raced row is reported with its line, both returned and persisted.
    assert_eq!(outcome.raced.len(), 1);
    assert_eq!(outcome.raced[0].line, 4);
    assert!(outcome.raced[0].message.contains("taken@gmail.com"));
    let lines: Vec<i64> = record
        .errors
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["line"].as_i64().unwrap())
        .collect();
    assert_eq!(lines, vec![4, 5]);

    let emails = LeadRepo::emails_for_tenant(&pool, a.tenant.id).await.unwrap();
    assert!(emails.contains("lease@enphase.com"));

    let history = LeadImportRepo::list_for_tenant(&pool, a.tenant.id, 10, 0).await.unwrap();
    assert_eq!(history.len(), 1);
}

// ---------------------------------------------------------------------------
// Journey
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn journey_steps_upsert_and_remove(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let l = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();

    JourneyRepo::complete(&pool, l.id, "site_survey", a.admin.id, Some("first"))
        .await
        .unwrap();
    let again = JourneyRepo::complete(&pool, l.id, "site_survey", a.admin.id, Some("second"))
        .await
        .unwrap();
    assert_eq!(again.notes.as_deref(), Some("second"));

    let steps = JourneyRepo::list_for_lead(&pool, l.id).await.unwrap();
    assert_eq!(steps.len(), 1);

    assert!(JourneyRepo::uncomplete(&pool, l.id, "site_survey").await.unwrap());
    assert!(!JourneyRepo::uncomplete(&pool, l.id, "site_survey").await.unwrap());
}

// ---------------------------------------------------------------------------
// Project requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_creates_project_and_wins_lead(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let l = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();
    let request = ProjectRequestRepo::create(
        &pool,
        a.tenant.id,
        a.admin.id,
        &CreateProjectRequest {
            lead_id: l.id,
            system_size_kw: Some(8.4),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, "pending");

    let project = CreateProject {
        lead_id: Some(l.id),
        name: "Jane - 8.4 kW".into(),
        system_size_kw: Some(8.4),
        ..Default::default()
    };
    let outcome =
        ProjectRequestRepo::approve(&pool, a.tenant.id, request.id, a.admin.id, None, &project)
            .await
            .unwrap();
    let (approved, created) = match outcome {
        Approval::Approved { request, project } => (request, project),
        other => panic!("expected approval, got {other:?}"),
    };

    assert_eq!(approved.status, "approved");
    assert_eq!(approved.project_id, Some(created.id));
    assert_eq!(created.status, "planning");

    let won = LeadRepo::find_by_id(&pool, a.tenant.id, l.id).await.unwrap().unwrap();
    assert_eq!(won.status, "won");

    // A second review finds nothing pending.
    assert_matches!(
        ProjectRequestRepo::approve(&pool, a.tenant.id, request.id, a.admin.id, None, &project)
            .await
            .unwrap(),
        Approval::NotPending
    );
    assert!(
        ProjectRequestRepo::reject(&pool, a.tenant.id, request.id, a.admin.id, "late")
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_one_pending_request_per_lead(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let l = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Jane", "jane@gmail.com"))
        .await
        .unwrap();
    let input = CreateProjectRequest {
        lead_id: l.id,
        system_size_kw: None,
        notes: None,
    };
    ProjectRequestRepo::create(&pool, a.tenant.id, a.admin.id, &input)
        .await
        .unwrap();
    let err = ProjectRequestRepo::create(&pool, a.tenant.id, a.admin.id, &input)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_project_requests_pending_lead"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_refuses_deleted_lead(pool: PgPool) {
    let a = register(&pool, "tenant-a").await;
    let l = LeadRepo::create(&pool, a.tenant.id, "manual", &lead("Gone", "gone@gmail.com"))
        .await
        .unwrap();
    let request = ProjectRequestRepo::create(
        &pool,
        a.tenant.id,
        a.admin.id,
        &CreateProjectRequest {
            lead_id: l.id,
            system_size_kw: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert!(LeadRepo::soft_delete(&pool, a.tenant.id, l.id).await.unwrap());

    let project = CreateProject {
        lead_id: Some(l.id),
        name: "Gone install".into(),
        ..Default::default()
    };
    assert_matches!(
        ProjectRequestRepo::approve(&pool, a.tenant.id, request.id, a.admin.id, None, &project)
            .await
            .unwrap(),
        Approval::LeadDeleted { lead_id } if lead_id == l.id
    );

    // Rolled back: no project, request still pending, deleted lead untouched.
    let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE tenant_id = $1")
        .bind(a.tenant.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(projects, 0);
    let still = ProjectRequestRepo::find_by_id(&pool, a.tenant.id, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, "pending");
    let status: String = sqlx::query_scalar("SELECT status FROM leads WHERE id = $1")
        .bind(l.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "new");
}
