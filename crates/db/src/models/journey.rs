//! Lead journey step model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};

/// A completed milestone from the `lead_journey_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JourneyStepRecord {
    pub id: DbId,
    pub lead_id: DbId,
    pub step: String,
    pub completed_at: Timestamp,
    pub completed_by: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `PUT /leads/{id}/journey/{step}`.
#[derive(Debug, Deserialize)]
pub struct SetJourneyStep {
    /// `false` removes the step's completion record.
    pub completed: bool,
    pub notes: Option<String>,
}
