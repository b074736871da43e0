//! Route definitions for the `/billing` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing`.
///
/// ```text
/// GET  /plans          -> list_plans (public)
/// GET  /subscription   -> get_subscription
/// POST /checkout       -> create_checkout (admin only)
/// POST /webhook        -> stripe_webhook (Stripe-signed, no auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(billing::list_plans))
        .route("/subscription", get(billing::get_subscription))
        .route("/checkout", post(billing::create_checkout))
        .route("/webhook", post(billing::stripe_webhook))
}
