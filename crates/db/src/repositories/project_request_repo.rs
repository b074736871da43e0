//! Repository for the `project_requests` table.

use sqlx::PgPool;
use solarfy_core::lead::LeadStatus;
use solarfy_core::project_request::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use solarfy_core::types::DbId;

use crate::models::project::{CreateProject, Project};
use crate::models::project_request::{
    CreateProjectRequest, ProjectRequest, ProjectRequestListParams,
};

const COLUMNS: &str = "\
    id, tenant_id, lead_id, requested_by, status, system_size_kw, notes, \
    reviewed_by, reviewed_at, review_notes, project_id, created_at, updated_at";

/// Result of [`ProjectRequestRepo::approve`].
#[derive(Debug)]
pub enum Approval {
    Approved {
        request: ProjectRequest,
        project: Project,
    },
    /// Missing, or already reviewed by someone else.
    NotPending,
    /// The lead was soft-deleted after the request was filed.
    LeadDeleted { lead_id: DbId },
}

pub struct ProjectRequestRepo;

impl ProjectRequestRepo {
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        requested_by: DbId,
        input: &CreateProjectRequest,
    ) -> Result<ProjectRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_requests \
                (tenant_id, lead_id, requested_by, system_size_kw, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(tenant_id)
            .bind(input.lead_id)
            .bind(requested_by)
            .bind(input.system_size_kw)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM project_requests WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List requests, optionally by status and/or requester, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        tenant_id: DbId,
        params: &ProjectRequestListParams,
        requested_by: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectRequest>, sqlx::Error> {
        let mut conditions: Vec<String> = vec!["tenant_id = $1".into()];
        let mut param_idx: usize = 2;

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if requested_by.is_some() {
            conditions.push(format!("requested_by = ${param_idx}"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM project_requests WHERE {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, ProjectRequest>(&query).bind(tenant_id);
        if let Some(s) = &params.status {
            q = q.bind(s);
        }
        if let Some(uid) = requested_by {
            q = q.bind(uid);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Approve a pending request: create the project, link it, and mark the
    /// lead `won`, all in one transaction.
    ///
    /// Nothing is written unless the request is still pending and its lead
    /// has not been deleted.
    pub async fn approve(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        reviewer_id: DbId,
        review_notes: Option<&str>,
        project: &CreateProject,
    ) -> Result<Approval, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lead_id: Option<DbId> = sqlx::query_scalar(
            "SELECT lead_id FROM project_requests \
             WHERE id = $1 AND tenant_id = $2 AND status = $3 \
             FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(STATUS_PENDING)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(lead_id) = lead_id else {
            return Ok(Approval::NotPending);
        };

        let won = sqlx::query(
            "UPDATE leads SET status = $3 \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(lead_id)
        .bind(tenant_id)
        .bind(LeadStatus::Won.as_str())
        .execute(&mut *tx)
        .await?;
        if won.rows_affected() == 0 {
            return Ok(Approval::LeadDeleted { lead_id });
        }

        let query = format!(
            "INSERT INTO projects \
                (tenant_id, lead_id, name, system_size_kw, address, \
                 enphase_system_id, install_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            crate::repositories::project_repo::COLUMNS
        );
        let created = sqlx::query_as::<_, Project>(&query)
            .bind(tenant_id)
            .bind(project.lead_id)
            .bind(&project.name)
            .bind(project.system_size_kw)
            .bind(&project.address)
            .bind(&project.enphase_system_id)
            .bind(project.install_date)
            .bind(&project.notes)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE project_requests SET \
                status = $3, reviewed_by = $4, reviewed_at = NOW(), \
                review_notes = $5, project_id = $6 \
             WHERE id = $1 AND tenant_id = $2 \
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(STATUS_APPROVED)
            .bind(reviewer_id)
            .bind(review_notes)
            .bind(created.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Approval::Approved {
            request,
            project: created,
        })
    }

    /// Reject a pending request. Returns `None` if it is missing or no
    /// longer pending.
    pub async fn reject(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        reviewer_id: DbId,
        review_notes: &str,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE project_requests SET \
                status = $4, reviewed_by = $5, reviewed_at = NOW(), review_notes = $6 \
             WHERE id = $1 AND tenant_id = $2 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(STATUS_PENDING)
            .bind(STATUS_REJECTED)
            .bind(reviewer_id)
            .bind(review_notes)
            .fetch_optional(pool)
            .await
    }
}
