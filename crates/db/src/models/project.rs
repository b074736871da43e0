//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub tenant_id: DbId,
    pub lead_id: Option<DbId>,
    pub name: String,
    pub status: String,
    pub system_size_kw: Option<f64>,
    pub address: Option<String>,
    pub enphase_system_id: Option<String>,
    pub install_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    pub lead_id: Option<DbId>,
    pub name: String,
    pub system_size_kw: Option<f64>,
    pub address: Option<String>,
    pub enphase_system_id: Option<String>,
    pub install_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub status: Option<String>,
    pub system_size_kw: Option<f64>,
    pub address: Option<String>,
    pub enphase_system_id: Option<String>,
    pub install_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Query parameters for listing projects.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<String>,
    pub lead_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
