//! Handlers for the `/project-requests` resource.
//!
//! Sales reps request a project for one of their leads; users holding
//! `project_requests.review` approve or reject. Approval creates the project
//! and marks the lead won in one transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use solarfy_core::error::CoreError;
use solarfy_core::project::{validate_name, validate_system_size};
use solarfy_core::project_request::{validate_review, ReviewDecision, VALID_STATUSES};
use solarfy_core::roles::Permission;
use solarfy_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use solarfy_core::types::DbId;
use solarfy_db::models::lead::Lead;
use solarfy_db::models::project::{CreateProject, Project};
use solarfy_db::models::project_request::{
    CreateProjectRequest, ProjectRequest, ProjectRequestListParams, ReviewProjectRequest,
};
use solarfy_db::repositories::project_request_repo::Approval;
use solarfy_db::repositories::{LeadRepo, ProjectRequestRepo};
use solarfy_events::bus::EVENT_PROJECT_REQUEST_REVIEWED;
use solarfy_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::leads::find_visible_lead;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `POST /project-requests/{id}/review`.
#[derive(Debug, Serialize)]
pub struct ReviewResult {
    pub request: ProjectRequest,
    /// The project created on approval.
    pub project: Option<Project>,
}

/// POST /api/v1/project-requests
pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsEdit)?;
    if let Some(kw) = input.system_size_kw {
        validate_system_size(kw)?;
    }
    input.notes = input
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    find_visible_lead(&state, &user, input.lead_id).await?;
    state.ensure_writable(user.tenant_id).await?;

    let request =
        ProjectRequestRepo::create(&state.pool, user.tenant_id, user.user_id, &input).await?;
    tracing::info!(
        request_id = request.id,
        lead_id = request.lead_id,
        requested_by = user.user_id,
        "Project requested",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/project-requests
///
/// Reviewers see every request in the tenant; everyone else only their own.
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProjectRequestListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        if !VALID_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid request status '{status}'. Must be one of: {VALID_STATUSES:?}"
            ))));
        }
    }
    let requested_by = own_scope(&user);
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let requests = ProjectRequestRepo::list_filtered(
        &state.pool,
        user.tenant_id,
        &params,
        requested_by,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/project-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = find_request(&state, &user, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/project-requests/{id}/review
pub async fn review_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewProjectRequest>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectRequestsReview)?;
    let request = find_request(&state, &user, id).await?;
    let notes = input.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
    validate_review(&request.status, input.decision, notes)?;
    state.ensure_writable(user.tenant_id).await?;

    let lead = LeadRepo::find_by_id(&state.pool, user.tenant_id, request.lead_id).await?;
    let lead_name = lead
        .as_ref()
        .map(|l| l.name.clone())
        .unwrap_or_else(|| format!("Lead #{}", request.lead_id));

    let result = match input.decision {
        ReviewDecision::Approve => {
            let project = approved_project(&request, lead.as_ref(), input.project_name.as_deref())?;
            match ProjectRequestRepo::approve(
                &state.pool,
                user.tenant_id,
                id,
                user.user_id,
                notes,
                &project,
            )
            .await?
            {
                Approval::Approved { request, project } => ReviewResult {
                    request,
                    project: Some(project),
                },
                Approval::NotPending => return Err(already_reviewed()),
                Approval::LeadDeleted { lead_id } => {
                    return Err(AppError::Core(CoreError::NotFound {
                        entity: "Lead",
                        id: lead_id,
                    }))
                }
            }
        }
        ReviewDecision::Reject => {
            let request = ProjectRequestRepo::reject(
                &state.pool,
                user.tenant_id,
                id,
                user.user_id,
                notes.unwrap_or_default(),
            )
            .await?
            .ok_or_else(already_reviewed)?;
            ReviewResult {
                request,
                project: None,
            }
        }
    };

    tracing::info!(
        request_id = id,
        status = %result.request.status,
        project_id = ?result.project.as_ref().map(|p| p.id),
        reviewed_by = user.user_id,
        "Project request reviewed",
    );

    state.publish(
        PlatformEvent::new(EVENT_PROJECT_REQUEST_REVIEWED, user.tenant_id)
            .with_source("project_request", id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "request_id": id,
                "lead_name": lead_name,
                "requested_by": result.request.requested_by,
                "status": result.request.status,
                "review_notes": result.request.review_notes,
            })),
    );

    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `None` for reviewers, otherwise the caller's id.
fn own_scope(user: &AuthUser) -> Option<DbId> {
    if user.can(Permission::ProjectRequestsReview) {
        None
    } else {
        Some(user.user_id)
    }
}

async fn find_request(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<ProjectRequest> {
    let scope = own_scope(user);
    ProjectRequestRepo::find_by_id(&state.pool, user.tenant_id, id)
        .await?
        .filter(|r| scope.is_none() || r.requested_by == scope)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectRequest",
            id,
        }))
}

/// Lost the race with a concurrent reviewer.
fn already_reviewed() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Project request has already been reviewed".into(),
    ))
}

/// Build the project an approval creates, named after the lead unless the
/// reviewer picked a name.
fn approved_project(
    request: &ProjectRequest,
    lead: Option<&Lead>,
    project_name: Option<&str>,
) -> AppResult<CreateProject> {
    let name = match project_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => lead
            .map(|l| l.name.clone())
            .unwrap_or_else(|| format!("Lead #{} installation", request.lead_id)),
    };
    validate_name(&name)?;

    let address = lead.and_then(|l| {
        let parts: Vec<&str> = [&l.address, &l.city, &l.state, &l.zip]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    });

    Ok(CreateProject {
        lead_id: Some(request.lead_id),
        name,
        system_size_kw: request.system_size_kw,
        address,
        notes: request.notes.clone(),
        ..Default::default()
    })
}
