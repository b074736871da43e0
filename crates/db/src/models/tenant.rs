//! Tenant entity model.

use serde::Serialize;
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `tenants` table: one installer company.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
