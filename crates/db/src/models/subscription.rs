//! Subscription model.

use serde::Serialize;
use sqlx::FromRow;
use solarfy_core::billing::{Plan, SubscriptionStatus};
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `subscriptions` table. Exactly one per tenant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub tenant_id: DbId,
    pub plan: String,
    pub status: String,
    pub trial_ends_at: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_subscription_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Typed plan. Unknown values (prevented by a CHECK constraint) fall back
    /// to the most restrictive plan.
    pub fn plan(&self) -> Plan {
        Plan::parse(&self.plan).unwrap_or(Plan::Starter)
    }

    /// Typed status. Unknown values fall back to `unpaid`, which blocks writes.
    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::parse(&self.status).unwrap_or(SubscriptionStatus::Unpaid)
    }
}

/// Fields a Stripe webhook may change.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    pub plan: Option<String>,
    pub status: Option<String>,
    pub current_period_end: Option<Timestamp>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}
