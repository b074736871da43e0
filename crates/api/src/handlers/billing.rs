//! Handlers for the `/billing` resource: plan catalogue, subscription
//! standing, Stripe Checkout, and the Stripe webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use solarfy_core::billing::{
    allows_writes, parse_plan, plan_catalog, verify_stripe_signature, PlanInfo, PlanLimits,
};
use solarfy_core::error::CoreError;
use solarfy_core::roles::Permission;
use solarfy_db::models::subscription::Subscription;
use solarfy_db::repositories::{LeadRepo, SubscriptionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::integrations::stripe::{webhook_action, StripeError, StripeEvent, WebhookAction};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header Stripe signs webhook deliveries with.
const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /billing/checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct Usage {
    pub users: i64,
    pub leads: i64,
}

/// Response body for `GET /billing/subscription`.
#[derive(Debug, Serialize)]
pub struct SubscriptionSummary {
    pub subscription: Subscription,
    pub plan_label: &'static str,
    pub limits: PlanLimits,
    pub usage: Usage,
    /// Whether the tenant can currently create or change data.
    pub writable: bool,
}

/// Response body for `POST /billing/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/billing/plans
pub async fn list_plans() -> Json<DataResponse<Vec<PlanInfo>>> {
    Json(DataResponse {
        data: plan_catalog(),
    })
}

/// GET /api/v1/billing/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let subscription = SubscriptionRepo::find_for_tenant(&state.pool, user.tenant_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id: user.tenant_id,
        }))?;
    let users = UserRepo::count_active(&state.pool, user.tenant_id).await?;
    let leads = LeadRepo::count_for_tenant(&state.pool, user.tenant_id).await?;

    let plan = subscription.plan();
    let writable = allows_writes(subscription.status(), subscription.trial_ends_at, Utc::now());
    Ok(Json(DataResponse {
        data: SubscriptionSummary {
            plan_label: plan.label(),
            limits: plan.limits(),
            usage: Usage { users, leads },
            writable,
            subscription,
        },
    }))
}

/// POST /api/v1/billing/checkout
///
/// Start a Stripe Checkout Session for the requested plan. The client
/// redirects the browser to the returned `url`.
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<impl IntoResponse> {
    admin.require(Permission::BillingManage)?;
    let plan = parse_plan(&input.plan)?;
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Stripe billing is not configured".into()))?;

    let user = UserRepo::find_in_tenant(&state.pool, admin.tenant_id, admin.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: admin.user_id,
        }))?;
    let existing_customer = SubscriptionRepo::find_for_tenant(&state.pool, admin.tenant_id)
        .await?
        .and_then(|s| s.stripe_customer_id);

    let session = stripe
        .create_checkout_session(admin.tenant_id, plan, &user.email, existing_customer.as_deref())
        .await
        .map_err(|e| match e {
            StripeError::MissingPrice(plan) => {
                AppError::BadRequest(format!("No Stripe price is configured for the {plan} plan"))
            }
            other => AppError::InternalError(format!("Stripe checkout failed: {other}")),
        })?;

    tracing::info!(
        tenant_id = admin.tenant_id,
        plan = %plan,
        session_id = %session.id,
        "Stripe checkout session created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CheckoutResponse {
                session_id: session.id,
                url: session.url,
            },
        }),
    ))
}

/// POST /api/v1/billing/webhook
///
/// Unauthenticated; trust comes from the `Stripe-Signature` header. The raw
/// body must be verified before it is parsed.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let secret = state
        .config
        .stripe
        .as_ref()
        .and_then(|s| s.webhook_secret.as_deref())
        .ok_or_else(|| AppError::BadRequest("Stripe webhooks are not configured".into()))?;

    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    verify_stripe_signature(&body, signature, secret, Utc::now().timestamp()).map_err(|e| {
        tracing::warn!(error = %e, "Rejected Stripe webhook");
        AppError::BadRequest("Invalid Stripe signature".into())
    })?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid Stripe event: {e}")))?;

    match webhook_action(&event) {
        Some(action) => apply_action(&state, &event, action).await?,
        None => {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring Stripe event");
        }
    }

    Ok(Json(json!({ "data": { "received": true } })))
}

/// Apply a webhook to the matching subscription row. Events for unknown
/// subscriptions are logged and acknowledged so Stripe stops retrying.
async fn apply_action(state: &AppState, event: &StripeEvent, action: WebhookAction) -> AppResult<()> {
    let (tenant_id, update) = match action {
        WebhookAction::Tenant { tenant_id, update } => (Some(tenant_id), update),
        WebhookAction::StripeSubscription {
            subscription_id,
            update,
        } => {
            let tenant_id =
                SubscriptionRepo::find_by_stripe_subscription(&state.pool, &subscription_id)
                    .await?
                    .map(|s| s.tenant_id);
            (tenant_id, update)
        }
    };

    let Some(tenant_id) = tenant_id else {
        tracing::warn!(event_id = %event.id, event_type = %event.event_type, "Stripe event matched no subscription");
        return Ok(());
    };

    match SubscriptionRepo::apply_update(&state.pool, tenant_id, &update).await? {
        Some(subscription) => tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            tenant_id,
            plan = %subscription.plan,
            status = %subscription.status,
            "Subscription updated from Stripe",
        ),
        None => tracing::warn!(event_id = %event.id, tenant_id, "Stripe event for unknown tenant"),
    }
    Ok(())
}
