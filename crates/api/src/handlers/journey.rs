//! Handlers for a lead's customer journey (`/leads/{id}/journey`).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use solarfy_core::journey::{journey_progress, next_step, parse_step, JourneyStep};
use solarfy_core::roles::Permission;
use solarfy_core::types::{DbId, Timestamp};
use solarfy_db::models::journey::{JourneyStepRecord, SetJourneyStep};
use solarfy_db::repositories::JourneyRepo;

use crate::error::AppResult;
use crate::handlers::leads::find_visible_lead;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One milestone in journey order, completed or not.
#[derive(Debug, Serialize)]
pub struct StepView {
    pub step: JourneyStep,
    pub label: &'static str,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub completed_by: Option<DbId>,
    pub notes: Option<String>,
}

/// Response body for the journey endpoints.
#[derive(Debug, Serialize)]
pub struct JourneyView {
    pub lead_id: DbId,
    /// Percentage of steps complete, 0-100.
    pub progress: u8,
    pub next_step: Option<JourneyStep>,
    pub steps: Vec<StepView>,
}

/// GET /api/v1/leads/{id}/journey
pub async fn get_journey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lead_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsView)?;
    find_visible_lead(&state, &user, lead_id).await?;
    let view = load_journey(&state, lead_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/leads/{id}/journey/{step}
///
/// `{"completed": true, "notes": "..."}` marks the step done (again);
/// `{"completed": false}` clears it. Returns the whole journey.
pub async fn set_step(
    State(state): State<AppState>,
    user: AuthUser,
    Path((lead_id, step)): Path<(DbId, String)>,
    Json(input): Json<SetJourneyStep>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::LeadsEdit)?;
    let step = parse_step(&step)?;
    find_visible_lead(&state, &user, lead_id).await?;
    state.ensure_writable(user.tenant_id).await?;

    if input.completed {
        let notes = input.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
        JourneyRepo::complete(&state.pool, lead_id, step.as_str(), user.user_id, notes).await?;
        tracing::info!(lead_id, step = %step, user_id = user.user_id, "Journey step completed");
    } else {
        let removed = JourneyRepo::uncomplete(&state.pool, lead_id, step.as_str()).await?;
        if removed {
            tracing::info!(lead_id, step = %step, user_id = user.user_id, "Journey step reopened");
        }
    }

    let view = load_journey(&state, lead_id).await?;
    Ok(Json(DataResponse { data: view }))
}

async fn load_journey(state: &AppState, lead_id: DbId) -> AppResult<JourneyView> {
    let records = JourneyRepo::list_for_lead(&state.pool, lead_id).await?;
    Ok(build_view(lead_id, &records))
}

/// Merge stored completions into the full ordered step list.
fn build_view(lead_id: DbId, records: &[JourneyStepRecord]) -> JourneyView {
    let completed: Vec<JourneyStep> = records
        .iter()
        .filter_map(|r| JourneyStep::parse(&r.step))
        .collect();

    let steps = JourneyStep::ORDERED
        .iter()
        .map(|step| {
            let record = records.iter().find(|r| r.step == step.as_str());
            StepView {
                step: *step,
                label: step.label(),
                completed: record.is_some(),
                completed_at: record.map(|r| r.completed_at),
                completed_by: record.and_then(|r| r.completed_by),
                notes: record.and_then(|r| r.notes.clone()),
            }
        })
        .collect();

    JourneyView {
        lead_id,
        progress: journey_progress(&completed),
        next_step: next_step(&completed),
        steps,
    }
}
