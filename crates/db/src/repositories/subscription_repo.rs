//! Repository for the `subscriptions` table.

use sqlx::PgPool;
use solarfy_core::types::DbId;

use crate::models::subscription::{Subscription, SubscriptionUpdate};

pub(crate) const COLUMNS: &str = "\
    id, tenant_id, plan, status, trial_ends_at, current_period_end, \
    stripe_customer_id, stripe_subscription_id, created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    pub async fn find_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE tenant_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_stripe_subscription(
        pool: &PgPool,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply webhook-driven changes. Only non-`None` fields are written.
    pub async fn apply_update(
        pool: &PgPool,
        tenant_id: DbId,
        input: &SubscriptionUpdate,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET \
                plan = COALESCE($2, plan), \
                status = COALESCE($3, status), \
                current_period_end = COALESCE($4, current_period_end), \
                stripe_customer_id = COALESCE($5, stripe_customer_id), \
                stripe_subscription_id = COALESCE($6, stripe_subscription_id) \
             WHERE tenant_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(tenant_id)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(input.current_period_end)
            .bind(&input.stripe_customer_id)
            .bind(&input.stripe_subscription_id)
            .fetch_optional(pool)
            .await
    }
}
