//! Dashboard aggregate rows.

use serde::Serialize;
use sqlx::FromRow;

/// One `GROUP BY status` bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
