//! Repository for the `project_images` table.

use sqlx::PgPool;
use solarfy_core::types::DbId;

use crate::models::project_image::{CreateProjectImage, ProjectImage};

const COLUMNS: &str = "\
    id, tenant_id, project_id, uploaded_by, file_path, original_name, \
    content_type, size_bytes, width, height, caption, created_at, updated_at";

pub struct ProjectImageRepo;

impl ProjectImageRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProjectImage,
    ) -> Result<ProjectImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_images \
                (tenant_id, project_id, uploaded_by, file_path, original_name, \
                 content_type, size_bytes, width, height, caption) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(input.tenant_id)
            .bind(input.project_id)
            .bind(input.uploaded_by)
            .bind(&input.file_path)
            .bind(&input.original_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.caption)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        tenant_id: DbId,
        project_id: DbId,
    ) -> Result<Vec<ProjectImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_images \
             WHERE project_id = $1 AND tenant_id = $2 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(project_id)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<ProjectImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_images \
             WHERE id = $1 AND project_id = $2 AND tenant_id = $3"
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(id)
            .bind(project_id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete the row, returning it so the caller can remove the file.
    pub async fn delete(
        pool: &PgPool,
        tenant_id: DbId,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<ProjectImage>, sqlx::Error> {
        let query = format!(
            "DELETE FROM project_images \
             WHERE id = $1 AND project_id = $2 AND tenant_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(id)
            .bind(project_id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }
}
