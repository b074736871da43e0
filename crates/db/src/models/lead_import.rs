//! Lead import audit record.

use serde::Serialize;
use sqlx::FromRow;
use solarfy_core::csv_import::RowError;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `lead_imports` table, one per uploaded CSV.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadImport {
    pub id: DbId,
    pub tenant_id: DbId,
    pub imported_by: Option<DbId>,
    pub file_name: String,
    pub total_rows: i32,
    pub imported_count: i32,
    pub duplicate_count: i32,
    pub error_count: i32,
    /// `[{ "line": n, "message": "..." }]` for skipped rows.
    pub errors: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a finished import.
#[derive(Debug)]
pub struct CreateLeadImport {
    pub tenant_id: DbId,
    pub imported_by: DbId,
    pub file_name: String,
    pub total_rows: i32,
    pub imported_count: i32,
    pub duplicate_count: i32,
    pub error_count: i32,
    /// Rows skipped while planning, duplicates and invalid rows alike.
    pub errors: Vec<RowError>,
}

/// What [`LeadImportRepo::import`](crate::repositories::LeadImportRepo::import)
/// wrote, plus the rows a concurrent writer claimed first.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub import: LeadImport,
    pub raced: Vec<RowError>,
}
