//! Repository for the `projects` table.

use sqlx::PgPool;
use solarfy_core::types::DbId;

use crate::models::project::{CreateProject, Project, ProjectListParams, UpdateProject};

/// Column list for `projects` queries.
pub(crate) const COLUMNS: &str = "\
    id, tenant_id, lead_id, name, status, system_size_kw, address, \
    enphase_system_id, install_date, notes, deleted_at, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (tenant_id, lead_id, name, system_size_kw, address, \
                 enphase_system_id, install_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(tenant_id)
            .bind(input.lead_id)
            .bind(&input.name)
            .bind(input.system_size_kw)
            .bind(&input.address)
            .bind(&input.enphase_system_id)
            .bind(input.install_date)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List projects with optional status/lead filters, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        tenant_id: DbId,
        params: &ProjectListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let mut conditions: Vec<String> =
            vec!["tenant_id = $1".into(), "deleted_at IS NULL".into()];
        let mut param_idx: usize = 2;

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if params.lead_id.is_some() {
            conditions.push(format!("lead_id = ${param_idx}"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(tenant_id);
        if let Some(s) = &params.status {
            q = q.bind(s);
        }
        if let Some(lead_id) = params.lead_id {
            q = q.bind(lead_id);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                name = COALESCE($3, name), \
                status = COALESCE($4, status), \
                system_size_kw = COALESCE($5, system_size_kw), \
                address = COALESCE($6, address), \
                enphase_system_id = COALESCE($7, enphase_system_id), \
                install_date = COALESCE($8, install_date), \
                notes = COALESCE($9, notes) \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.status)
            .bind(input.system_size_kw)
            .bind(&input.address)
            .bind(&input.enphase_system_id)
            .bind(input.install_date)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
