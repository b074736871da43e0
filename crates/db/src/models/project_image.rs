//! Project photo model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `project_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectImage {
    pub id: DbId,
    pub tenant_id: DbId,
    pub project_id: DbId,
    pub uploaded_by: Option<DbId>,
    /// Path relative to the upload root.
    #[serde(skip_serializing)]
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub width: i32,
    pub height: i32,
    pub caption: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an uploaded image.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectImage {
    pub tenant_id: DbId,
    pub project_id: DbId,
    pub uploaded_by: DbId,
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub width: i32,
    pub height: i32,
    pub caption: Option<String>,
}
