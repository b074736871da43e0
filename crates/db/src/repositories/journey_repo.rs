//! Repository for the `lead_journey_steps` table.

use sqlx::PgPool;
use solarfy_core::types::DbId;

use crate::models::journey::JourneyStepRecord;

const COLUMNS: &str = "id, lead_id, step, completed_at, completed_by, notes, created_at, updated_at";

/// Journey milestones. Callers verify the lead belongs to their tenant
/// before touching its steps.
pub struct JourneyRepo;

impl JourneyRepo {
    pub async fn list_for_lead(
        pool: &PgPool,
        lead_id: DbId,
    ) -> Result<Vec<JourneyStepRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lead_journey_steps WHERE lead_id = $1 ORDER BY completed_at"
        );
        sqlx::query_as::<_, JourneyStepRecord>(&query)
            .bind(lead_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a step complete. Re-completing a step refreshes its timestamp,
    /// author, and notes.
    pub async fn complete(
        pool: &PgPool,
        lead_id: DbId,
        step: &str,
        user_id: DbId,
        notes: Option<&str>,
    ) -> Result<JourneyStepRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO lead_journey_steps (lead_id, step, completed_by, notes)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (lead_id, step) DO UPDATE SET
                completed_at = NOW(),
                completed_by = EXCLUDED.completed_by,
                notes = EXCLUDED.notes
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyStepRecord>(&query)
            .bind(lead_id)
            .bind(step)
            .bind(user_id)
            .bind(notes)
            .fetch_one(pool)
            .await
    }

    /// Remove a completion. Returns `true` if a row was deleted.
    pub async fn uncomplete(pool: &PgPool, lead_id: DbId, step: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lead_journey_steps WHERE lead_id = $1 AND step = $2")
            .bind(lead_id)
            .bind(step)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
