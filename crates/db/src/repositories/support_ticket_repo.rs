//! Repository for `support_tickets` and `ticket_responses`.

use sqlx::PgPool;
use solarfy_core::support_ticket::{marks_resolved, PRIORITY_NORMAL};
use solarfy_core::types::DbId;

use crate::models::support_ticket::{
    CreateSupportTicket, CreateTicketResponse, SupportTicket, TicketListParams, TicketResponse,
    UpdateSupportTicket,
};

const COLUMNS: &str = "\
    id, tenant_id, created_by, assigned_to, subject, description, \
    priority, status, resolved_at, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, ticket_id, author_id, body, is_internal, created_at, updated_at";

pub struct SupportTicketRepo;

impl SupportTicketRepo {
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        created_by: DbId,
        input: &CreateSupportTicket,
    ) -> Result<SupportTicket, sqlx::Error> {
        let query = format!(
            "INSERT INTO support_tickets (tenant_id, created_by, subject, description, priority) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupportTicket>(&query)
            .bind(tenant_id)
            .bind(created_by)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(input.priority.as_deref().unwrap_or(PRIORITY_NORMAL))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<SupportTicket>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM support_tickets WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, SupportTicket>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets newest first. `created_by` limits to one user's tickets.
    pub async fn list_filtered(
        pool: &PgPool,
        tenant_id: DbId,
        params: &TicketListParams,
        created_by: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SupportTicket>, sqlx::Error> {
        let mut conditions: Vec<String> = vec!["tenant_id = $1".into()];
        let mut param_idx: usize = 2;

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if params.priority.is_some() {
            conditions.push(format!("priority = ${param_idx}"));
            param_idx += 1;
        }
        if created_by.is_some() {
            conditions.push(format!("created_by = ${param_idx}"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM support_tickets WHERE {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, SupportTicket>(&query).bind(tenant_id);
        if let Some(s) = &params.status {
            q = q.bind(s);
        }
        if let Some(p) = &params.priority {
            q = q.bind(p);
        }
        if let Some(uid) = created_by {
            q = q.bind(uid);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Apply a patch. `resolved_at` is set when the ticket moves into a
    /// resolved state and cleared when it is re-opened.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateSupportTicket,
    ) -> Result<Option<SupportTicket>, sqlx::Error> {
        let resolved = input.status.as_deref().map(marks_resolved);
        let query = format!(
            "UPDATE support_tickets SET \
                status = COALESCE($3, status), \
                priority = COALESCE($4, priority), \
                assigned_to = COALESCE($5, assigned_to), \
                resolved_at = CASE \
                    WHEN $6::BOOLEAN IS NULL THEN resolved_at \
                    WHEN $6 THEN COALESCE(resolved_at, NOW()) \
                    ELSE NULL END \
             WHERE id = $1 AND tenant_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SupportTicket>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.assigned_to)
            .bind(resolved)
            .fetch_optional(pool)
            .await
    }

    pub async fn add_response(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        input: &CreateTicketResponse,
    ) -> Result<TicketResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_responses (ticket_id, author_id, body, is_internal) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, TicketResponse>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(&input.body)
            .bind(input.is_internal)
            .fetch_one(pool)
            .await
    }

    /// Responses oldest first. Internal notes are excluded unless requested.
    pub async fn list_responses(
        pool: &PgPool,
        ticket_id: DbId,
        include_internal: bool,
    ) -> Result<Vec<TicketResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM ticket_responses \
             WHERE ticket_id = $1 AND ($2 OR is_internal = false) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, TicketResponse>(&query)
            .bind(ticket_id)
            .bind(include_internal)
            .fetch_all(pool)
            .await
    }
}
