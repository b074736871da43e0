//! Handlers for the `/leads` resource.
//!
//! Sales reps only ever see leads assigned to them: a lead outside the
//! caller's scope is reported as not found, exactly like a lead of another
//! tenant.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use solarfy_core::billing::check_limit;
use solarfy_core::customer_type::{classify_email, CustomerType};
use solarfy_core::error::CoreError;
use solarfy_core::lead::{
    parse_status, validate_product_services, validate_source, validate_transition, SOURCE_MANUAL,
};
use solarfy_core::roles::Permission;
use solarfy_core::search::{clamp_limit, clamp_offset, like_pattern, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use solarfy_core::types::DbId;
use solarfy_core::validation::{normalize_email, normalize_phone};
use solarfy_db::models::lead::{AssignLead, CreateLead, Lead, LeadListParams, UpdateLead};
use solarfy_db::repositories::{LeadRepo, UserRepo};
use solarfy_events::bus::EVENT_LEAD_ASSIGNED;
use solarfy_events::PlatformEvent;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/leads
///
/// Create a lead by hand. Leads created by a sales rep are always assigned
/// to that rep.
pub async fn create_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<CreateLead>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsEdit)?;
    input.validate()?;
    validate_product_services(&input.product_services)?;

    let source = input.source.clone().unwrap_or_else(|| SOURCE_MANUAL.to_string());
    validate_source(&source)?;

    input.name = input.name.trim().to_string();
    input.email = input.email.as_deref().map(normalize_email);
    input.phone = input.phone.as_deref().and_then(normalize_phone);
    input.state = input.state.as_deref().map(|s| s.trim().to_ascii_uppercase());
    input.customer_type = match input.customer_type.as_deref() {
        Some(raw) => Some(parse_customer_type(raw)?.as_str().to_string()),
        None => input
            .email
            .as_deref()
            .and_then(classify_email)
            .map(|ct| ct.as_str().to_string()),
    };
    input.assigned_to = match user.lead_scope() {
        Some(own_id) => Some(own_id),
        None => match input.assigned_to {
            Some(assignee) => Some(ensure_assignable(&state, user.tenant_id, assignee).await?),
            None => None,
        },
    };

    state.ensure_writable(user.tenant_id).await?;
    let plan = state.plan(user.tenant_id).await?;
    let current = LeadRepo::count_for_tenant(&state.pool, user.tenant_id).await?;
    check_limit(plan.limits().max_leads, current, 1, "leads")?;

    let lead = LeadRepo::create(&state.pool, user.tenant_id, &source, &input).await?;

    tracing::info!(
        lead_id = lead.id,
        tenant_id = user.tenant_id,
        source = %source,
        created_by = user.user_id,
        "Lead created",
    );

    if let Some(assignee) = lead.assigned_to.filter(|a| *a != user.user_id) {
        publish_assigned(&state, &user, &lead, assignee);
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: lead })))
}

/// GET /api/v1/leads
pub async fn list_leads(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LeadListParams>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsView)?;
    if let Some(status) = &params.status {
        parse_status(status)?;
    }
    if let Some(ct) = &params.customer_type {
        parse_customer_type(ct)?;
    }

    let pattern = params.q.as_deref().and_then(like_pattern);
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let leads = LeadRepo::list_filtered(
        &state.pool,
        user.tenant_id,
        &params,
        pattern.as_deref(),
        user.lead_scope(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: leads }))
}

/// GET /api/v1/leads/{id}
pub async fn get_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsView)?;
    let lead = find_visible_lead(&state, &user, id).await?;
    Ok(Json(DataResponse { data: lead }))
}

/// PUT /api/v1/leads/{id}
pub async fn update_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateLead>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsEdit)?;
    input.validate()?;
    let existing = find_visible_lead(&state, &user, id).await?;

    if let Some(next) = &input.status {
        validate_transition(&existing.status, next)?;
    }
    if let Some(services) = &input.product_services {
        validate_product_services(services)?;
    }
    if let Some(ct) = &input.customer_type {
        parse_customer_type(ct)?;
    }

    input.name = input.name.map(|n| n.trim().to_string());
    input.email = input.email.as_deref().map(normalize_email);
    input.phone = input.phone.as_deref().and_then(normalize_phone);
    input.state = input.state.as_deref().map(|s| s.trim().to_ascii_uppercase());

    state.ensure_writable(user.tenant_id).await?;
    let lead = LeadRepo::update(&state.pool, user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))?;

    if existing.status != lead.status {
        tracing::info!(
            lead_id = id,
            from = %existing.status,
            to = %lead.status,
            user_id = user.user_id,
            "Lead status changed",
        );
    }

    Ok(Json(DataResponse { data: lead }))
}

/// DELETE /api/v1/leads/{id}
///
/// Soft-delete. Returns 204 No Content.
pub async fn delete_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Permission::LeadsEdit)?;
    find_visible_lead(&state, &user, id).await?;
    state.ensure_writable(user.tenant_id).await?;

    let deleted = LeadRepo::soft_delete(&state.pool, user.tenant_id, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Lead", id }));
    }
    tracing::info!(lead_id = id, user_id = user.user_id, "Lead deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/leads/{id}/assign
///
/// Reassign or unassign a lead. Only roles that see every lead may assign.
pub async fn assign_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AssignLead>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsEdit)?;
    if user.lead_scope().is_some() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only managers and admins can assign leads".into(),
        )));
    }
    let assignee = match input.user_id {
        Some(uid) => Some(ensure_assignable(&state, user.tenant_id, uid).await?),
        None => None,
    };
    state.ensure_writable(user.tenant_id).await?;

    let lead = LeadRepo::assign(&state.pool, user.tenant_id, id, assignee)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))?;

    tracing::info!(
        lead_id = id,
        assigned_to = ?assignee,
        assigned_by = user.user_id,
        "Lead assigned",
    );

    if let Some(assignee) = assignee {
        publish_assigned(&state, &user, &lead, assignee);
    }

    Ok(Json(DataResponse { data: lead }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a lead the caller is allowed to see.
pub(crate) async fn find_visible_lead(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Lead> {
    LeadRepo::find_by_id(&state.pool, user.tenant_id, id)
        .await?
        .filter(|lead| match user.lead_scope() {
            Some(own_id) => lead.assigned_to == Some(own_id),
            None => true,
        })
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))
}

fn parse_customer_type(raw: &str) -> AppResult<CustomerType> {
    CustomerType::parse(raw).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Invalid customer type '{raw}'. Must be one of: {:?}",
            CustomerType::ALL
        )))
    })
}

/// The assignee must be an active user of the same tenant.
async fn ensure_assignable(state: &AppState, tenant_id: DbId, user_id: DbId) -> AppResult<DbId> {
    match UserRepo::find_in_tenant(&state.pool, tenant_id, user_id).await? {
        Some(u) if u.is_active => Ok(u.id),
        _ => Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} cannot be assigned leads"
        )))),
    }
}

fn publish_assigned(state: &AppState, user: &AuthUser, lead: &Lead, assignee: DbId) {
    state.publish(
        PlatformEvent::new(EVENT_LEAD_ASSIGNED, user.tenant_id)
            .with_source("lead", lead.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "lead_id": lead.id,
                "lead_name": lead.name,
                "assignee_id": assignee,
            })),
    );
}
