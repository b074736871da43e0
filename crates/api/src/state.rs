use std::sync::Arc;

use solarfy_core::billing::Plan;
use solarfy_core::error::CoreError;
use solarfy_core::types::DbId;
use solarfy_db::repositories::SubscriptionRepo;
use solarfy_events::{EventBus, PlatformEvent};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::integrations::enphase::EnphaseClient;
use crate::integrations::stripe::StripeClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: solarfy_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Present when Enphase credentials are configured.
    pub enphase: Option<Arc<EnphaseClient>>,
    /// Present when a Stripe secret key is configured.
    pub stripe: Option<Arc<StripeClient>>,
}

impl AppState {
    /// Build state from a pool and config, creating integration clients for
    /// whichever integrations are configured.
    pub fn new(pool: solarfy_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let http = reqwest::Client::new();
        let enphase = config
            .enphase
            .clone()
            .map(|c| Arc::new(EnphaseClient::new(http, c)));
        let stripe = config
            .stripe
            .clone()
            .map(|c| Arc::new(StripeClient::new(c)));
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            enphase,
            stripe,
        }
    }

    pub fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }

    /// Fail with 403 unless the tenant's subscription currently allows writes.
    pub async fn ensure_writable(&self, tenant_id: DbId) -> AppResult<()> {
        let subscription = SubscriptionRepo::find_for_tenant(&self.pool, tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "Tenant has no subscription".into(),
                ))
            })?;
        solarfy_core::billing::ensure_writable(
            subscription.status(),
            subscription.trial_ends_at,
            chrono::Utc::now(),
        )?;
        Ok(())
    }

    /// The tenant's current plan. Tenants without a subscription row get the
    /// most restrictive plan.
    pub async fn plan(&self, tenant_id: DbId) -> AppResult<Plan> {
        Ok(SubscriptionRepo::find_for_tenant(&self.pool, tenant_id)
            .await?
            .map(|s| s.plan())
            .unwrap_or(Plan::Starter))
    }
}
