//! Support ticket status constants, priorities, and validation.
//!
//! Defines the valid ticket statuses, transition rules, and validation
//! helpers used by the API and repository layers.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status of a newly created ticket.
pub const STATUS_OPEN: &str = "open";
/// Someone on the support side is working the ticket.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// Blocked on a reply from the person who raised it.
pub const STATUS_WAITING_ON_CUSTOMER: &str = "waiting_on_customer";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_WAITING_ON_CUSTOMER,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

/// Statuses counted as open work on the dashboard.
pub const UNRESOLVED_STATUSES: &[&str] =
    &[STATUS_OPEN, STATUS_IN_PROGRESS, STATUS_WAITING_ON_CUSTOMER];

// ---------------------------------------------------------------------------
// Priority constants
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_NORMAL: &str = "normal";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const VALID_PRIORITIES: &[&str] =
    &[PRIORITY_LOW, PRIORITY_NORMAL, PRIORITY_HIGH, PRIORITY_URGENT];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MAX_BODY_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses that `from_status` may transition to.
///
/// Transition rules:
/// - `open`                -> `in_progress`, `closed`
/// - `in_progress`         -> `waiting_on_customer`, `resolved`, `closed`
/// - `waiting_on_customer` -> `in_progress`, `resolved`, `closed`
/// - `resolved`            -> `closed`, `in_progress` (re-open)
/// - `closed`              -> `in_progress` (re-open)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_OPEN => &[STATUS_IN_PROGRESS, STATUS_CLOSED],
        STATUS_IN_PROGRESS => &[STATUS_WAITING_ON_CUSTOMER, STATUS_RESOLVED, STATUS_CLOSED],
        STATUS_WAITING_ON_CUSTOMER => &[STATUS_IN_PROGRESS, STATUS_RESOLVED, STATUS_CLOSED],
        STATUS_RESOLVED => &[STATUS_CLOSED, STATUS_IN_PROGRESS],
        STATUS_CLOSED => &[STATUS_IN_PROGRESS],
        _ => &[],
    }
}

/// Validate that a status transition from `current` to `next` is allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition ticket from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Whether moving into `status` marks the ticket resolved (sets `resolved_at`).
pub fn marks_resolved(status: &str) -> bool {
    status == STATUS_RESOLVED || status == STATUS_CLOSED
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid ticket status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid ticket priority '{priority}'. Must be one of: {VALID_PRIORITIES:?}"
        )))
    }
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_subject(subject: &str) -> Result<(), CoreError> {
    validate_text("Subject", subject, MAX_SUBJECT_LENGTH)
}

/// Applies to both the ticket description and each response body.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    validate_text("Body", body, MAX_BODY_LENGTH)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
