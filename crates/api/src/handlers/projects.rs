//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use solarfy_core::error::CoreError;
use solarfy_core::project::{validate_name, validate_status, validate_system_size, validate_transition};
use solarfy_core::roles::Permission;
use solarfy_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use solarfy_core::types::DbId;
use solarfy_db::models::project::{CreateProject, Project, ProjectListParams, UpdateProject};
use solarfy_db::repositories::{LeadRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsEdit)?;
    validate_name(&input.name)?;
    input.name = input.name.trim().to_string();
    if let Some(kw) = input.system_size_kw {
        validate_system_size(kw)?;
    }
    if let Some(lead_id) = input.lead_id {
        ensure_lead_exists(&state, user.tenant_id, lead_id).await?;
    }
    state.ensure_writable(user.tenant_id).await?;

    let project = ProjectRepo::create(&state.pool, user.tenant_id, &input).await?;
    tracing::info!(
        project_id = project.id,
        tenant_id = user.tenant_id,
        lead_id = ?project.lead_id,
        created_by = user.user_id,
        "Project created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsView)?;
    if let Some(status) = &params.status {
        validate_status(status)?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let projects =
        ProjectRepo::list_filtered(&state.pool, user.tenant_id, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsView)?;
    let project = find_project(&state, user.tenant_id, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsEdit)?;
    let existing = find_project(&state, user.tenant_id, id).await?;

    if let Some(name) = &input.name {
        validate_name(name)?;
        input.name = Some(name.trim().to_string());
    }
    if let Some(kw) = input.system_size_kw {
        validate_system_size(kw)?;
    }
    if let Some(next) = &input.status {
        validate_transition(&existing.status, next)?;
    }
    state.ensure_writable(user.tenant_id).await?;

    let project = ProjectRepo::update(&state.pool, user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Project", id }))?;

    if project.status != existing.status {
        tracing::info!(
            project_id = id,
            from = %existing.status,
            to = %project.status,
            user_id = user.user_id,
            "Project status changed",
        );
    }
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Soft-delete. Returns 204 No Content.
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Permission::ProjectsEdit)?;
    state.ensure_writable(user.tenant_id).await?;
    let deleted = ProjectRepo::soft_delete(&state.pool, user.tenant_id, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Project", id }));
    }
    tracing::info!(project_id = id, user_id = user.user_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_project(state: &AppState, tenant_id: DbId, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Project", id }))
}

async fn ensure_lead_exists(state: &AppState, tenant_id: DbId, lead_id: DbId) -> AppResult<()> {
    LeadRepo::find_by_id(&state.pool, tenant_id, lead_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lead",
            id: lead_id,
        }))
}
