//! Project request model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::project_request::ReviewDecision;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `project_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectRequest {
    pub id: DbId,
    pub tenant_id: DbId,
    pub lead_id: DbId,
    pub requested_by: Option<DbId>,
    pub status: String,
    pub system_size_kw: Option<f64>,
    pub notes: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_notes: Option<String>,
    /// Set when the request is approved.
    pub project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for requesting a project for a lead.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub lead_id: DbId,
    pub system_size_kw: Option<f64>,
    pub notes: Option<String>,
}

/// Request body for `POST /project-requests/{id}/review`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewProjectRequest {
    pub decision: ReviewDecision,
    pub notes: Option<String>,
    /// Name for the project created on approval. Defaults to the lead's name.
    pub project_name: Option<String>,
}

/// Query parameters for listing project requests.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectRequestListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
