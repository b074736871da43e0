//! Project request review workflow.
//!
//! A sales rep requests a project for a qualified lead; a reviewer either
//! approves it (which creates the project) or rejects it. Review is one-shot.

use serde::Deserialize;

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Maximum length of reviewer notes.
pub const MAX_REVIEW_NOTES_LENGTH: usize = 2_000;

/// A reviewer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    /// The request status the decision produces.
    pub fn resulting_status(&self) -> &'static str {
        match self {
            Self::Approve => STATUS_APPROVED,
            Self::Reject => STATUS_REJECTED,
        }
    }
}

/// Check that a request in `current_status` can be reviewed.
///
/// Rejections must carry notes so the requester knows why.
pub fn validate_review(
    current_status: &str,
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<(), CoreError> {
    if current_status != STATUS_PENDING {
        return Err(CoreError::Conflict(format!(
            "Project request has already been {current_status}"
        )));
    }
    let notes = notes.map(str::trim).unwrap_or_default();
    if decision == ReviewDecision::Reject && notes.is_empty() {
        return Err(CoreError::Validation(
            "Review notes are required when rejecting a request".into(),
        ));
    }
    if notes.chars().count() > MAX_REVIEW_NOTES_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review notes exceed {MAX_REVIEW_NOTES_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_requests_can_be_approved_without_notes() {
        assert!(validate_review(STATUS_PENDING, ReviewDecision::Approve, None).is_ok());
    }

    #[test]
    fn rejection_requires_notes() {
        assert_matches!(
            validate_review(STATUS_PENDING, ReviewDecision::Reject, Some("  ")),
            Err(CoreError::Validation(_))
        );
        assert!(validate_review(STATUS_PENDING, ReviewDecision::Reject, Some("No roof access")).is_ok());
    }

    #[test]
    fn reviewed_requests_cannot_be_reviewed_again() {
        for status in [STATUS_APPROVED, STATUS_REJECTED] {
            assert_matches!(
                validate_review(status, ReviewDecision::Approve, None),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn decision_maps_to_status() {
        assert_eq!(ReviewDecision::Approve.resulting_status(), STATUS_APPROVED);
        assert_eq!(ReviewDecision::Reject.resulting_status(), STATUS_REJECTED);
    }
}
