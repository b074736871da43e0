//! Repository for the `leads` table.

use std::collections::HashSet;

use sqlx::PgPool;
use solarfy_core::types::DbId;

use crate::models::lead::{CreateLead, Lead, LeadListParams, UpdateLead};

/// Column list for `leads` queries.
pub(crate) const COLUMNS: &str = "\
    id, tenant_id, name, email, phone, address, city, state, zip, \
    product_services, status, customer_type, reference, source, notes, \
    assigned_to, deleted_at, created_at, updated_at";

/// Provides CRUD operations for leads. Soft-deleted rows are invisible to
/// every read.
pub struct LeadRepo;

impl LeadRepo {
    /// Insert a lead. `input` must already be normalised; `source` is one of
    /// the core lead sources.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        source: &str,
        input: &CreateLead,
    ) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads \
                (tenant_id, name, email, phone, address, city, state, zip, \
                 product_services, customer_type, reference, source, notes, assigned_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip)
            .bind(&input.product_services)
            .bind(&input.customer_type)
            .bind(&input.reference)
            .bind(source)
            .bind(&input.notes)
            .bind(input.assigned_to)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leads \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List leads with optional filters, newest first.
    ///
    /// `only_assigned_to` restricts the result to one user's leads regardless
    /// of `params.assigned_to`; it is how sales reps are scoped.
    pub async fn list_filtered(
        pool: &PgPool,
        tenant_id: DbId,
        params: &LeadListParams,
        search_pattern: Option<&str>,
        only_assigned_to: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let mut conditions: Vec<String> =
            vec!["tenant_id = $1".into(), "deleted_at IS NULL".into()];
        let mut param_idx: usize = 2;

        let assigned_to = only_assigned_to.or(params.assigned_to);

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if params.customer_type.is_some() {
            conditions.push(format!("customer_type = ${param_idx}"));
            param_idx += 1;
        }
        if assigned_to.is_some() {
            conditions.push(format!("assigned_to = ${param_idx}"));
            param_idx += 1;
        }
        if search_pattern.is_some() {
            conditions.push(format!(
                "(name ILIKE ${param_idx} OR email ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM leads WHERE {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Lead>(&query).bind(tenant_id);
        if let Some(s) = &params.status {
            q = q.bind(s);
        }
        if let Some(ct) = &params.customer_type {
            q = q.bind(ct);
        }
        if let Some(uid) = assigned_to {
            q = q.bind(uid);
        }
        if let Some(pattern) = search_pattern {
            q = q.bind(pattern);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Update a lead. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateLead,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET \
                name = COALESCE($3, name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                address = COALESCE($6, address), \
                city = COALESCE($7, city), \
                state = COALESCE($8, state), \
                zip = COALESCE($9, zip), \
                product_services = COALESCE($10, product_services), \
                status = COALESCE($11, status), \
                customer_type = COALESCE($12, customer_type), \
                reference = COALESCE($13, reference), \
                notes = COALESCE($14, notes) \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip)
            .bind(&input.product_services)
            .bind(&input.status)
            .bind(&input.customer_type)
            .bind(&input.reference)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the assignee.
    pub async fn assign(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        user_id: Option<DbId>,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET assigned_to = $3 \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a lead. Returns `false` if it was missing or already deleted.
    pub async fn soft_delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE leads SET deleted_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of live leads in a tenant, for plan limits.
    pub async fn count_for_tenant(pool: &PgPool, tenant_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM leads WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Lower-cased emails of every live lead in a tenant, for import
    /// de-duplication.
    pub async fn emails_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<HashSet<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT LOWER(email) FROM leads \
             WHERE tenant_id = $1 AND deleted_at IS NULL AND email IS NOT NULL",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(e,)| e).collect())
    }
}
