//! Repository for the `tenants` table, including tenant sign-up.

use sqlx::PgPool;
use solarfy_core::types::{DbId, Timestamp};

use crate::models::subscription::Subscription;
use crate::models::tenant::Tenant;
use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, name, slug, is_active, created_at, updated_at";

/// Everything created when a company signs up.
#[derive(Debug)]
pub struct RegisteredTenant {
    pub tenant: Tenant,
    pub admin: User,
    pub subscription: Subscription,
}

pub struct TenantRepo;

impl TenantRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tenants WHERE slug = $1)")
            .bind(slug)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Create a tenant, its first admin, and a trial subscription atomically.
    ///
    /// `admin.tenant_id` is ignored and replaced with the new tenant's ID.
    pub async fn register(
        pool: &PgPool,
        name: &str,
        slug: &str,
        admin: &CreateUser,
        plan: &str,
        trial_ends_at: Timestamp,
    ) -> Result<RegisteredTenant, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO tenants (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO users (tenant_id, email, full_name, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            crate::repositories::user_repo::COLUMNS
        );
        let admin = sqlx::query_as::<_, User>(&query)
            .bind(tenant.id)
            .bind(&admin.email)
            .bind(&admin.full_name)
            .bind(&admin.password_hash)
            .bind(admin.role_id)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO subscriptions (tenant_id, plan, status, trial_ends_at)
             VALUES ($1, $2, 'trialing', $3)
             RETURNING {}",
            crate::repositories::subscription_repo::COLUMNS
        );
        let subscription = sqlx::query_as::<_, Subscription>(&query)
            .bind(tenant.id)
            .bind(plan)
            .bind(trial_ends_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RegisteredTenant {
            tenant,
            admin,
            subscription,
        })
    }
}
