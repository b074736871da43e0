//! Installation project statuses, transition rules, and validation.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_PLANNING: &str = "planning";
pub const STATUS_PERMITTING: &str = "permitting";
pub const STATUS_INSTALLING: &str = "installing";
pub const STATUS_INSPECTION: &str = "inspection";
pub const STATUS_COMPLETED: &str = "completed";
/// Work paused; resumes into any active stage.
pub const STATUS_ON_HOLD: &str = "on_hold";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid project statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PLANNING,
    STATUS_PERMITTING,
    STATUS_INSTALLING,
    STATUS_INSPECTION,
    STATUS_COMPLETED,
    STATUS_ON_HOLD,
    STATUS_CANCELLED,
];

/// Statuses that count as "in progress" on the dashboard.
pub const ACTIVE_STATUSES: &[&str] = &[
    STATUS_PLANNING,
    STATUS_PERMITTING,
    STATUS_INSTALLING,
    STATUS_INSPECTION,
];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Upper bound on system size, in kilowatts.
pub const MAX_SYSTEM_SIZE_KW: f64 = 1_000.0;

pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses that `from_status` may transition to.
///
/// Transition rules:
/// - each active stage -> the next stage, `on_hold`, `cancelled`
/// - `inspection`      -> `completed`, `on_hold`, `cancelled`
/// - `on_hold`         -> any active stage, `cancelled`
/// - `completed`, `cancelled` are terminal
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_PLANNING => &[STATUS_PERMITTING, STATUS_ON_HOLD, STATUS_CANCELLED],
        STATUS_PERMITTING => &[STATUS_INSTALLING, STATUS_ON_HOLD, STATUS_CANCELLED],
        STATUS_INSTALLING => &[STATUS_INSPECTION, STATUS_ON_HOLD, STATUS_CANCELLED],
        STATUS_INSPECTION => &[STATUS_COMPLETED, STATUS_ON_HOLD, STATUS_CANCELLED],
        STATUS_ON_HOLD => &[
            STATUS_PLANNING,
            STATUS_PERMITTING,
            STATUS_INSTALLING,
            STATUS_INSPECTION,
            STATUS_CANCELLED,
        ],
        _ => &[],
    }
}

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid project status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

/// Validate a status change. Re-submitting the current status is allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    validate_status(next)?;
    if current == next {
        return Ok(());
    }
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition project from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

pub fn is_terminal(status: &str) -> bool {
    status == STATUS_COMPLETED || status == STATUS_CANCELLED
}

/// System size must be a positive number of kilowatts no larger than
/// [`MAX_SYSTEM_SIZE_KW`].
pub fn validate_system_size(kw: f64) -> Result<(), CoreError> {
    if kw.is_finite() && kw > 0.0 && kw <= MAX_SYSTEM_SIZE_KW {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "System size must be greater than 0 and at most {MAX_SYSTEM_SIZE_KW} kW"
        )))
    }
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Project name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name exceeds {MAX_PROJECT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
