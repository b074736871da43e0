//! Stripe Checkout client and webhook event interpretation.
//!
//! Checkout Sessions are created through `async-stripe`'s typed request
//! structs. Signature verification lives in `solarfy_core::billing`; this
//! module turns a verified event into the subscription change it implies.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use solarfy_core::billing::{
    Plan, SubscriptionStatus, EVENT_CHECKOUT_COMPLETED, EVENT_INVOICE_PAYMENT_FAILED,
    EVENT_SUBSCRIPTION_DELETED, EVENT_SUBSCRIPTION_UPDATED,
};
use solarfy_core::types::DbId;
use solarfy_db::models::subscription::SubscriptionUpdate;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionSubscriptionData, CustomerId,
};

use crate::config::StripeConfig;

/// Errors from the Stripe API layer.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe API error: {0}")]
    Api(#[from] stripe::StripeError),

    /// No price id is configured for the requested plan.
    #[error("No Stripe price configured for plan '{0}'")]
    MissingPrice(Plan),

    #[error("Invalid Stripe customer id '{0}'")]
    InvalidCustomer(String),
}

/// The parts of a created Checkout Session the browser needs.
#[derive(Debug, Clone)]
pub struct CheckoutLink {
    pub id: String,
    pub url: Option<String>,
}

/// Client for the Stripe API.
pub struct StripeClient {
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> Client {
        Client::from_url(self.config.api_base.as_str(), self.config.secret_key.as_str())
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Subscription-mode Checkout parameters for `tenant_id`.
    ///
    /// The tenant id rides in `client_reference_id` and the plan in
    /// `metadata[plan]` so the completion webhook can apply both. The
    /// subscription carries the same metadata for later update events.
    pub fn checkout_params<'a>(
        &'a self,
        tenant: &'a str,
        plan: Plan,
        customer_email: &'a str,
        existing_customer: Option<&str>,
    ) -> Result<CreateCheckoutSession<'a>, StripeError> {
        let price = self
            .config
            .price_for(plan)
            .ok_or(StripeError::MissingPrice(plan))?;

        let metadata: HashMap<String, String> = [
            ("tenant_id".to_string(), tenant.to_string()),
            ("plan".to_string(), plan.as_str().to_string()),
        ]
        .into_iter()
        .collect();

        let mut params = CreateCheckoutSession {
            success_url: Some(&self.config.success_url),
            cancel_url: Some(&self.config.cancel_url),
            client_reference_id: Some(tenant),
            mode: Some(CheckoutSessionMode::Subscription),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(price.to_string()),
                quantity: Some(1),
                ..Default::default()
            }]),
            metadata: Some(metadata.clone()),
            subscription_data: Some(CreateCheckoutSessionSubscriptionData {
                metadata: Some(metadata),
                ..Default::default()
            }),
            ..Default::default()
        };

        match existing_customer {
            Some(id) => {
                let customer: CustomerId = id
                    .parse()
                    .map_err(|_| StripeError::InvalidCustomer(id.to_string()))?;
                params.customer = Some(customer);
            }
            None => params.customer_email = Some(customer_email),
        }
        Ok(params)
    }

    /// Create a subscription-mode Checkout Session for `tenant_id`.
    pub async fn create_checkout_session(
        &self,
        tenant_id: DbId,
        plan: Plan,
        customer_email: &str,
        existing_customer: Option<&str>,
    ) -> Result<CheckoutLink, StripeError> {
        let tenant = tenant_id.to_string();
        let params = self.checkout_params(&tenant, plan, customer_email, existing_customer)?;
        let session = CheckoutSession::create(&self.client(), params).await?;
        Ok(CheckoutLink {
            id: session.id.to_string(),
            url: session.url,
        })
    }
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// Envelope of a Stripe webhook delivery.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

/// Which subscription row a webhook applies to, and how to change it.
#[derive(Debug, Clone)]
pub enum WebhookAction {
    /// Identified by our tenant id (checkout completion).
    Tenant {
        tenant_id: DbId,
        update: SubscriptionUpdate,
    },
    /// Identified by Stripe's subscription id.
    StripeSubscription {
        subscription_id: String,
        update: SubscriptionUpdate,
    },
}

fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// Stripe expands some references into objects; accept both shapes.
fn id_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn metadata_plan(object: &Value) -> Option<String> {
    object
        .get("metadata")
        .and_then(|m| str_field(m, "plan"))
        .and_then(Plan::parse)
        .map(|p| p.as_str().to_string())
}

/// Interpret a verified event. `None` means acknowledge and ignore.
pub fn webhook_action(event: &StripeEvent) -> Option<WebhookAction> {
    let object = &event.data.object;
    match event.event_type.as_str() {
        EVENT_CHECKOUT_COMPLETED => {
            let tenant_id = str_field(object, "client_reference_id")?.parse().ok()?;
            Some(WebhookAction::Tenant {
                tenant_id,
                update: SubscriptionUpdate {
                    plan: metadata_plan(object),
                    status: Some(SubscriptionStatus::Active.as_str().to_string()),
                    current_period_end: None,
                    stripe_customer_id: id_field(object, "customer"),
                    stripe_subscription_id: id_field(object, "subscription"),
                },
            })
        }
        EVENT_SUBSCRIPTION_UPDATED | EVENT_SUBSCRIPTION_DELETED => {
            let subscription_id = str_field(object, "id")?.to_string();
            let status = if event.event_type == EVENT_SUBSCRIPTION_DELETED {
                Some(SubscriptionStatus::Canceled)
            } else {
                str_field(object, "status").and_then(SubscriptionStatus::from_stripe)
            };
            let current_period_end = object
                .get("current_period_end")
                .and_then(Value::as_i64)
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
            Some(WebhookAction::StripeSubscription {
                subscription_id,
                update: SubscriptionUpdate {
                    plan: metadata_plan(object),
                    status: status.map(|s| s.as_str().to_string()),
                    current_period_end,
                    stripe_customer_id: None,
                    stripe_subscription_id: None,
                },
            })
        }
        EVENT_INVOICE_PAYMENT_FAILED => {
            let subscription_id = id_field(object, "subscription")?;
            Some(WebhookAction::StripeSubscription {
                subscription_id,
                update: SubscriptionUpdate {
                    status: Some(SubscriptionStatus::PastDue.as_str().to_string()),
                    ..Default::default()
                },
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn event(event_type: &str, object: Value) -> StripeEvent {
        StripeEvent {
            id: "evt_1".into(),
            event_type: event_type.into(),
            data: StripeEventData { object },
        }
    }

    #[test]
    fn checkout_completion_activates_tenant() {
        let e = event(
            EVENT_CHECKOUT_COMPLETED,
            json!({
                "client_reference_id": "42",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": {"plan": "professional"}
            }),
        );
        assert_matches!(
            webhook_action(&e),
            Some(WebhookAction::Tenant { tenant_id: 42, update })
                if update.plan.as_deref() == Some("professional")
                    && update.status.as_deref() == Some("active")
                    && update.stripe_customer_id.as_deref() == Some("cus_1")
                    && update.stripe_subscription_id.as_deref() == Some("sub_1")
        );
    }

    #[test]
    fn subscription_update_maps_stripe_status() {
        let e = event(
            EVENT_SUBSCRIPTION_UPDATED,
            json!({"id": "sub_1", "status": "incomplete", "current_period_end": 1_800_000_000}),
        );
        assert_matches!(
            webhook_action(&e),
            Some(WebhookAction::StripeSubscription { subscription_id, update })
                if subscription_id == "sub_1"
                    && update.status.as_deref() == Some("past_due")
                    && update.current_period_end.is_some()
        );
    }

    #[test]
    fn deletion_cancels_and_failed_invoice_marks_past_due() {
        let deleted = event(EVENT_SUBSCRIPTION_DELETED, json!({"id": "sub_1", "status": "active"}));
        assert_matches!(
            webhook_action(&deleted),
            Some(WebhookAction::StripeSubscription { update, .. })
                if update.status.as_deref() == Some("canceled")
        );

        let failed = event(
            EVENT_INVOICE_PAYMENT_FAILED,
            json!({"subscription": {"id": "sub_9"}}),
        );
        assert_matches!(
            webhook_action(&failed),
            Some(WebhookAction::StripeSubscription { subscription_id, update })
                if subscription_id == "sub_9" && update.status.as_deref() == Some("past_due")
        );
    }

    #[test]
    fn unknown_or_incomplete_events_are_ignored() {
        assert!(webhook_action(&event("customer.created", json!({}))).is_none());
        assert!(webhook_action(&event(EVENT_CHECKOUT_COMPLETED, json!({}))).is_none());
    }

    fn stripe_client(price: Option<&str>) -> StripeClient {
        StripeClient::new(StripeConfig {
            secret_key: "sk_test_123".into(),
            webhook_secret: None,
            starter_price_id: None,
            professional_price_id: price.map(String::from),
            enterprise_price_id: None,
            success_url: "http://localhost/ok".into(),
            cancel_url: "http://localhost/cancel".into(),
            api_base: "http://127.0.0.1:9".into(),
        })
    }

    #[test]
    fn checkout_params_carry_tenant_and_plan() {
        let stripe = stripe_client(Some("price_pro"));
        let params = stripe
            .checkout_params("42", Plan::Professional, "admin@sun.test", None)
            .unwrap();

        assert_eq!(params.mode, Some(CheckoutSessionMode::Subscription));
        assert_eq!(params.client_reference_id, Some("42"));
        assert_eq!(params.customer_email, Some("admin@sun.test"));
        assert!(params.customer.is_none());
        let items = params.line_items.as_ref().unwrap();
        assert_eq!(items[0].price.as_deref(), Some("price_pro"));
        assert_eq!(items[0].quantity, Some(1));
        let metadata = params.metadata.as_ref().unwrap();
        assert_eq!(metadata.get("plan").map(String::as_str), Some("professional"));
        assert_eq!(metadata.get("tenant_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn checkout_params_reuse_existing_customer() {
        let stripe = stripe_client(Some("price_pro"));
        let params = stripe
            .checkout_params("42", Plan::Professional, "admin@sun.test", Some("cus_123"))
            .unwrap();
        assert_eq!(params.customer.map(|c| c.to_string()).as_deref(), Some("cus_123"));
        assert!(params.customer_email.is_none());
    }

    #[test]
    fn checkout_params_require_a_price() {
        let stripe = stripe_client(None);
        assert_matches!(
            stripe.checkout_params("42", Plan::Professional, "a@b.test", None),
            Err(StripeError::MissingPrice(Plan::Professional))
        );
    }

    #[test]
    fn envelope_deserializes() {
        let raw = r#"{"id":"evt_1","type":"invoice.payment_failed","data":{"object":{"subscription":"sub_1"}}}"#;
        let e: StripeEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(e.event_type, EVENT_INVOICE_PAYMENT_FAILED);
    }
}
