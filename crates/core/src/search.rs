//! List filtering and pagination helpers.
//!
//! Lives in `core` (zero internal deps) so both the API and repository
//! layers can share the same limits.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per list page.
pub const DEFAULT_LIST_LIMIT: i64 = 25;

/// Maximum number of rows per list page.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Query builder helpers
// ---------------------------------------------------------------------------

/// Turn free-text search input into an `ILIKE` pattern.
///
/// Escapes `%`, `_`, and `\` so user input is matched literally, then wraps
/// the term in `%...%`. Whitespace-only input returns `None`.
///
/// ```
/// use solarfy_core::search::like_pattern;
/// assert_eq!(like_pattern(" smith "), Some("%smith%".to_string()));
/// assert_eq!(like_pattern("50%"), Some("%50\\%%".to_string()));
/// assert_eq!(like_pattern("  "), None);
/// ```
pub fn like_pattern(query: &str) -> Option<String> {
    let term = query.trim();
    if term.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
