//! Handlers for CSV lead imports (`/leads/import`, `/leads/imports`).

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use solarfy_core::billing::check_limit;
use solarfy_core::csv_import::{plan_import, CustomerTypeCounts, RowError};
use solarfy_core::roles::Permission;
use solarfy_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use solarfy_db::models::lead::ImportedLead;
use solarfy_db::models::lead_import::{CreateLeadImport, LeadImport};
use solarfy_db::repositories::{LeadImportRepo, LeadRepo};
use solarfy_events::bus::EVENT_LEAD_IMPORT_COMPLETED;
use solarfy_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// File name recorded when the upload carries none.
const DEFAULT_FILE_NAME: &str = "leads.csv";

/// Response body for `POST /leads/import`.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub import: LeadImport,
    pub customer_types: CustomerTypeCounts,
    /// Leads whose email domain was on neither domain list.
    pub classified_by_default: usize,
    pub duplicates: Vec<RowError>,
    pub errors: Vec<RowError>,
}

/// POST /api/v1/leads/import
///
/// Accepts a multipart form with a required `file` field holding a CSV.
/// Valid, non-duplicate rows are inserted in one transaction; skipped rows
/// are reported back with their line numbers.
pub async fn import_leads(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsImport)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, data.to_vec()));
    }
    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    state.ensure_writable(user.tenant_id).await?;

    let existing = LeadRepo::emails_for_tenant(&state.pool, user.tenant_id).await?;
    let plan = plan_import(&data, &existing)?;

    let subscription_plan = state.plan(user.tenant_id).await?;
    let current = LeadRepo::count_for_tenant(&state.pool, user.tenant_id).await?;
    check_limit(
        subscription_plan.limits().max_leads,
        current,
        plan.leads.len() as i64,
        "leads",
    )?;

    // Reps would otherwise lose sight of the rows they just imported.
    let assigned_to = user.lead_scope();
    let rows: Vec<ImportedLead> = plan
        .leads
        .iter()
        .map(|lead| ImportedLead {
            line: lead.line,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            reference: lead.reference.clone(),
            customer_type: lead.customer_type.map(|ct| ct.as_str().to_string()),
            assigned_to,
        })
        .collect();

    let mut skipped: Vec<RowError> = plan
        .errors
        .iter()
        .chain(&plan.duplicates)
        .cloned()
        .collect();
    skipped.sort_by_key(|e| e.line);

    let outcome = LeadImportRepo::import(
        &state.pool,
        &CreateLeadImport {
            tenant_id: user.tenant_id,
            imported_by: user.user_id,
            file_name,
            total_rows: plan.total_rows as i32,
            imported_count: rows.len() as i32,
            duplicate_count: plan.duplicates.len() as i32,
            error_count: plan.errors.len() as i32,
            errors: skipped,
        },
        &rows,
    )
    .await?;
    let record = outcome.import;

    tracing::info!(
        import_id = record.id,
        tenant_id = user.tenant_id,
        total = record.total_rows,
        imported = record.imported_count,
        duplicates = record.duplicate_count,
        errors = record.error_count,
        "Lead import completed",
    );

    state.publish(
        PlatformEvent::new(EVENT_LEAD_IMPORT_COMPLETED, user.tenant_id)
            .with_source("lead_import", record.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "import_id": record.id,
                "file_name": record.file_name,
                "imported": record.imported_count,
                "duplicates": record.duplicate_count,
                "errors": record.error_count,
            })),
    );

    let customer_types = plan.customer_type_counts();
    let classified_by_default = plan.leads.iter().filter(|l| l.classified_by_default).count();
    let mut duplicates = plan.duplicates;
    duplicates.extend(outcome.raced);
    duplicates.sort_by_key(|e| e.line);

    let result = ImportResult {
        customer_types,
        classified_by_default,
        duplicates,
        errors: plan.errors,
        import: record,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/leads/imports
pub async fn list_imports(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsImport)?;
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let imports = LeadImportRepo::list_for_tenant(&state.pool, user.tenant_id, limit, offset).await?;
    Ok(Json(DataResponse { data: imports }))
}
