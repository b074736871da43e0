//! Handler for the tenant dashboard summary.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use solarfy_core::roles::Permission;
use solarfy_db::models::dashboard::StatusCount;
use solarfy_db::models::subscription::Subscription;
use solarfy_db::repositories::{DashboardRepo, SubscriptionRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `GET /dashboard/summary`.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Scoped to the caller's own leads for sales reps.
    pub leads_by_status: Vec<StatusCount>,
    pub projects_by_status: Vec<StatusCount>,
    pub open_tickets: i64,
    pub pending_project_requests: i64,
    pub subscription: Option<Subscription>,
}

/// GET /api/v1/dashboard/summary
pub async fn get_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let leads_by_status = if user.can(Permission::LeadsView) {
        DashboardRepo::lead_status_counts(&state.pool, user.tenant_id, user.lead_scope()).await?
    } else {
        Vec::new()
    };
    let projects_by_status = if user.can(Permission::ProjectsView) {
        DashboardRepo::project_status_counts(&state.pool, user.tenant_id).await?
    } else {
        Vec::new()
    };
    let open_tickets = DashboardRepo::open_ticket_count(&state.pool, user.tenant_id).await?;
    let pending_project_requests =
        DashboardRepo::pending_request_count(&state.pool, user.tenant_id).await?;
    let subscription = SubscriptionRepo::find_for_tenant(&state.pool, user.tenant_id).await?;

    Ok(Json(DataResponse {
        data: DashboardSummary {
            leads_by_status,
            projects_by_status,
            open_tickets,
            pending_project_requests,
            subscription,
        },
    }))
}
