//! Live system monitoring for installed projects.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use solarfy_core::error::CoreError;
use solarfy_core::roles::Permission;
use solarfy_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::handlers::projects::find_project;
use crate::integrations::enphase::{EnphaseError, SystemSummary};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MonitoringResponse {
    pub project_id: DbId,
    pub enphase_system_id: String,
    pub summary: SystemSummary,
}

/// GET /api/v1/projects/{id}/monitoring
pub async fn get_monitoring(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::MonitoringView)?;
    let project = find_project(&state, user.tenant_id, project_id).await?;

    let client = state.enphase.as_ref().ok_or_else(|| {
        AppError::BadRequest("Enphase monitoring is not configured".into())
    })?;
    let system_id = project
        .enphase_system_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Project has no Enphase system id".into())
        })?;

    let summary = client.system_summary(&system_id).await.map_err(|e| match e {
        EnphaseError::SystemNotFound(id) => AppError::Core(CoreError::Validation(format!(
            "Enphase system '{id}' was not found"
        ))),
        other => AppError::InternalError(format!("Enphase request failed: {other}")),
    })?;

    Ok(Json(DataResponse {
        data: MonitoringResponse {
            project_id,
            enphase_system_id: system_id,
            summary,
        },
    }))
}
