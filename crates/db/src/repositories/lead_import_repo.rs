//! Repository for CSV lead imports.

use sqlx::types::Json;
use sqlx::PgPool;
use solarfy_core::csv_import::RowError;
use solarfy_core::lead::SOURCE_CSV_IMPORT;
use solarfy_core::types::DbId;

use crate::models::lead::ImportedLead;
use crate::models::lead_import::{CreateLeadImport, ImportOutcome, LeadImport};

const COLUMNS: &str = "\
    id, tenant_id, imported_by, file_name, total_rows, imported_count, \
    duplicate_count, error_count, errors, created_at, updated_at";

pub struct LeadImportRepo;

impl LeadImportRepo {
    /// Insert the leads and the audit record in one transaction.
    ///
    /// Rows whose email was claimed by a concurrent writer since planning are
    /// skipped, returned in [`ImportOutcome::raced`], and recorded as
    /// duplicates with their line numbers. `imported_count` on the stored
    /// record is the number of rows actually inserted.
    pub async fn import(
        pool: &PgPool,
        input: &CreateLeadImport,
        leads: &[ImportedLead],
    ) -> Result<ImportOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut inserted: i32 = 0;
        let mut raced: Vec<RowError> = Vec::new();
        for lead in leads {
            let id: Option<DbId> = sqlx::query_scalar(
                "INSERT INTO leads \
                    (tenant_id, name, email, phone, reference, customer_type, source, assigned_to) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (tenant_id, (LOWER(email))) \
                    WHERE deleted_at IS NULL AND email IS NOT NULL \
                 DO NOTHING \
                 RETURNING id",
            )
            .bind(input.tenant_id)
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.reference)
            .bind(&lead.customer_type)
            .bind(SOURCE_CSV_IMPORT)
            .bind(lead.assigned_to)
            .fetch_optional(&mut *tx)
            .await?;

            match id {
                Some(_) => inserted += 1,
                None => raced.push(RowError {
                    line: lead.line,
                    message: format!(
                        "A lead with email '{}' was added while this import ran",
                        lead.email.as_deref().unwrap_or_default()
                    ),
                }),
            }
        }

        if !raced.is_empty() {
            tracing::debug!(
                tenant_id = input.tenant_id,
                raced = raced.len(),
                "Import rows lost to concurrent inserts, counted as duplicates",
            );
        }

        let mut errors: Vec<&RowError> = input.errors.iter().chain(&raced).collect();
        errors.sort_by_key(|e| e.line);

        let query = format!(
            "INSERT INTO lead_imports \
                (tenant_id, imported_by, file_name, total_rows, imported_count, \
                 duplicate_count, error_count, errors) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let import = sqlx::query_as::<_, LeadImport>(&query)
            .bind(input.tenant_id)
            .bind(input.imported_by)
            .bind(&input.file_name)
            .bind(input.total_rows)
            .bind(inserted)
            .bind(input.duplicate_count + raced.len() as i32)
            .bind(input.error_count)
            .bind(Json(&errors))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ImportOutcome { import, raced })
    }

    /// Recent imports for a tenant, newest first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeadImport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lead_imports WHERE tenant_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, LeadImport>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
