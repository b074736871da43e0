//! Subscription plans, plan limits, and Stripe webhook signatures.

use chrono::Duration;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Length of the free trial given to every new tenant.
pub const TRIAL_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Professional,
    Enterprise,
}

/// Seat and lead caps for a plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub max_users: Option<i64>,
    pub max_leads: Option<i64>,
}

impl Plan {
    pub const ALL: &'static [&'static str] = &["starter", "professional", "enterprise"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starter" => Some(Self::Starter),
            "professional" => Some(Self::Professional),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Professional => "Professional",
            Self::Enterprise => "Enterprise",
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            Self::Starter => PlanLimits {
                max_users: Some(3),
                max_leads: Some(500),
            },
            Self::Professional => PlanLimits {
                max_users: Some(15),
                max_leads: Some(10_000),
            },
            Self::Enterprise => PlanLimits {
                max_users: None,
                max_leads: None,
            },
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public description of a plan for the pricing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlanInfo {
    pub plan: Plan,
    pub label: &'static str,
    #[serde(flatten)]
    pub limits: PlanLimits,
}

pub fn plan_catalog() -> Vec<PlanInfo> {
    [Plan::Starter, Plan::Professional, Plan::Enterprise]
        .into_iter()
        .map(|plan| PlanInfo {
            plan,
            label: plan.label(),
            limits: plan.limits(),
        })
        .collect()
}

pub fn parse_plan(s: &str) -> Result<Plan, CoreError> {
    Plan::parse(s).ok_or_else(|| {
        CoreError::Validation(format!(
            "Unknown plan '{s}'. Must be one of: {:?}",
            Plan::ALL
        ))
    })
}

/// Fail when adding `adding` items to `current` would exceed `limit`.
pub fn check_limit(
    limit: Option<i64>,
    current: i64,
    adding: i64,
    what: &str,
) -> Result<(), CoreError> {
    match limit {
        Some(max) if current + adding > max => Err(CoreError::Forbidden(format!(
            "Plan limit reached: at most {max} {what} (currently {current})"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Subscription status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    pub const ALL: &'static [&'static str] =
        &["trialing", "active", "past_due", "canceled", "unpaid"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }

    /// Map a Stripe subscription status onto ours.
    ///
    /// Stripe has a few states we fold together: `incomplete` behaves like
    /// `past_due`, `incomplete_expired` like `canceled`, `paused` like `unpaid`.
    pub fn from_stripe(s: &str) -> Option<Self> {
        match s {
            "incomplete" => Some(Self::PastDue),
            "incomplete_expired" => Some(Self::Canceled),
            "paused" => Some(Self::Unpaid),
            other => Self::parse(other),
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// End of a trial that starts at `now`.
pub fn trial_end(now: Timestamp) -> Timestamp {
    now + Duration::days(TRIAL_DAYS)
}

/// Whether a tenant in this standing may create or modify data.
///
/// `past_due` keeps write access as a grace period while Stripe retries.
pub fn allows_writes(
    status: SubscriptionStatus,
    trial_ends_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    match status {
        SubscriptionStatus::Active | SubscriptionStatus::PastDue => true,
        SubscriptionStatus::Trialing => trial_ends_at.is_some_and(|end| now < end),
        SubscriptionStatus::Canceled | SubscriptionStatus::Unpaid => false,
    }
}

/// [`allows_writes`] as a `Result`, for handlers.
pub fn ensure_writable(
    status: SubscriptionStatus,
    trial_ends_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if allows_writes(status, trial_ends_at, now) {
        return Ok(());
    }
    let reason = match status {
        SubscriptionStatus::Trialing => "Your free trial has ended".to_string(),
        other => format!("Your subscription is {other}"),
    };
    Err(CoreError::Forbidden(format!(
        "{reason}. Choose a plan to continue making changes."
    )))
}

// ---------------------------------------------------------------------------
// Stripe webhooks
// ---------------------------------------------------------------------------

pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const EVENT_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const EVENT_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
pub const EVENT_INVOICE_PAYMENT_FAILED: &str = "invoice.payment_failed";

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, the Stripe `v1` scheme.
pub fn compute_stripe_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(mac_for(secret, timestamp, payload).finalize().into_bytes())
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1: Vec<String>,
}

/// Parse `t=...,v1=...[,v1=...]`. Unknown schemes are ignored.
pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, CoreError> {
    let mut timestamp = None;
    let mut v1 = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => v1.push(value.to_string()),
            _ => {}
        }
    }
    let timestamp = timestamp
        .ok_or_else(|| CoreError::Unauthorized("Stripe signature has no timestamp".into()))?;
    if v1.is_empty() {
        return Err(CoreError::Unauthorized(
            "Stripe signature has no v1 signature".into(),
        ));
    }
    Ok(SignatureHeader { timestamp, v1 })
}

/// Verify a webhook body against its `Stripe-Signature` header.
///
/// Accepts when any `v1` entry matches and the timestamp is within
/// [`SIGNATURE_TOLERANCE_SECS`] of `now_unix`. Comparison is constant-time.
pub fn verify_stripe_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), CoreError> {
    let parsed = parse_signature_header(header)?;
    if (now_unix - parsed.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(CoreError::Unauthorized(
            "Stripe signature timestamp is outside the tolerance window".into(),
        ));
    }
    let matched = parsed.v1.iter().any(|candidate| {
        hex::decode(candidate).is_some_and(|bytes| {
            mac_for(secret, parsed.timestamp, payload)
                .verify_slice(&bytes)
                .is_ok()
        })
    });
    if matched {
        Ok(())
    } else {
        Err(CoreError::Unauthorized("Stripe signature mismatch".into()))
    }
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

pub mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string. Returns `None` on odd length or non-hex input.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    // -- plans ---------------------------------------------------------------

    #[test]
    fn plan_limits() {
        assert_eq!(Plan::Starter.limits().max_users, Some(3));
        assert_eq!(Plan::Starter.limits().max_leads, Some(500));
        assert_eq!(Plan::Professional.limits().max_users, Some(15));
        assert_eq!(Plan::Professional.limits().max_leads, Some(10_000));
        assert_eq!(Plan::Enterprise.limits().max_leads, None);
        assert_eq!(plan_catalog().len(), 3);
    }

    #[test]
    fn check_limit_counts_the_batch() {
        assert!(check_limit(Some(500), 490, 10, "leads").is_ok());
        assert_matches!(
            check_limit(Some(500), 490, 11, "leads"),
            Err(CoreError::Forbidden(_))
        );
        assert!(check_limit(None, 1_000_000, 1, "leads").is_ok());
    }

    #[test]
    fn parse_plan_rejects_unknown() {
        assert_eq!(parse_plan("professional").unwrap(), Plan::Professional);
        assert!(parse_plan("platinum").is_err());
    }

    // -- standing ------------------------------------------------------------

    #[test]
    fn trial_allows_writes_until_it_ends() {
        let start = at(1_700_000_000);
        let end = trial_end(start);
        assert!(allows_writes(SubscriptionStatus::Trialing, Some(end), start));
        assert!(!allows_writes(SubscriptionStatus::Trialing, Some(end), end));
        assert!(!allows_writes(SubscriptionStatus::Trialing, None, start));
    }

    #[test]
    fn past_due_keeps_a_grace_period() {
        let now = at(1_700_000_000);
        assert!(allows_writes(SubscriptionStatus::Active, None, now));
        assert!(allows_writes(SubscriptionStatus::PastDue, None, now));
        assert!(!allows_writes(SubscriptionStatus::Canceled, None, now));
        assert!(ensure_writable(SubscriptionStatus::Unpaid, None, now)
            .unwrap_err()
            .to_string()
            .contains("unpaid"));
    }

    #[test]
    fn stripe_statuses_map_onto_ours() {
        assert_eq!(SubscriptionStatus::from_stripe("active"), Some(SubscriptionStatus::Active));
        assert_eq!(
            SubscriptionStatus::from_stripe("incomplete_expired"),
            Some(SubscriptionStatus::Canceled)
        );
        assert_eq!(SubscriptionStatus::from_stripe("bogus"), None);
    }

    // -- signatures ----------------------------------------------------------

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"invoice.payment_failed"}"#;

    fn header(ts: i64, sig: &str) -> String {
        format!("t={ts},v1={sig}")
    }

    #[test]
    fn valid_signature_is_accepted() {
        let ts = 1_700_000_000;
        let sig = compute_stripe_signature(SECRET, ts, BODY);
        assert_eq!(sig.len(), 64);
        assert!(verify_stripe_signature(BODY, &header(ts, &sig), SECRET, ts + 10).is_ok());
    }

    #[test]
    fn any_matching_v1_entry_is_enough() {
        let ts = 1_700_000_000;
        let sig = compute_stripe_signature(SECRET, ts, BODY);
        let h = format!("t={ts},v1={},v0=legacy,v1={sig}", "00".repeat(32));
        assert!(verify_stripe_signature(BODY, &h, SECRET, ts).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let ts = 1_700_000_000;
        let sig = compute_stripe_signature(SECRET, ts, BODY);
        let err = verify_stripe_signature(b"{}", &header(ts, &sig), SECRET, ts).unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(_));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let ts = 1_700_000_000;
        let sig = compute_stripe_signature("whsec_other", ts, BODY);
        assert!(verify_stripe_signature(BODY, &header(ts, &sig), SECRET, ts).is_err());
    }

    #[test]
    fn stale_signature_is_rejected() {
        let ts = 1_700_000_000;
        let sig = compute_stripe_signature(SECRET, ts, BODY);
        let now = ts + SIGNATURE_TOLERANCE_SECS + 1;
        assert!(verify_stripe_signature(BODY, &header(ts, &sig), SECRET, now).is_err());
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
        assert!(parse_signature_header("garbage").is_err());
        assert!(verify_stripe_signature(BODY, "t=1,v1=zz", SECRET, 1).is_err());
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex::decode(&hex::encode([0u8, 15, 255])), Some(vec![0, 15, 255]));
        assert_eq!(hex::decode("abc"), None);
    }
}
