//! Aggregate queries for the dashboard.

use sqlx::PgPool;
use solarfy_core::support_ticket::UNRESOLVED_STATUSES;
use solarfy_core::types::DbId;

use crate::models::dashboard::StatusCount;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Live leads per status. `assigned_to` scopes the counts to one user.
    pub async fn lead_status_counts(
        pool: &PgPool,
        tenant_id: DbId,
        assigned_to: Option<DbId>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM leads \
             WHERE tenant_id = $1 AND deleted_at IS NULL \
               AND ($2::BIGINT IS NULL OR assigned_to = $2) \
             GROUP BY status ORDER BY status",
        )
        .bind(tenant_id)
        .bind(assigned_to)
        .fetch_all(pool)
        .await
    }

    pub async fn project_status_counts(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM projects \
             WHERE tenant_id = $1 AND deleted_at IS NULL \
             GROUP BY status ORDER BY status",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }

    pub async fn open_ticket_count(pool: &PgPool, tenant_id: DbId) -> Result<i64, sqlx::Error> {
        let statuses: Vec<String> = UNRESOLVED_STATUSES.iter().map(|s| s.to_string()).collect();
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM support_tickets WHERE tenant_id = $1 AND status = ANY($2)",
        )
        .bind(tenant_id)
        .bind(&statuses)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn pending_request_count(pool: &PgPool, tenant_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM project_requests WHERE tenant_id = $1 AND status = 'pending'",
        )
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
