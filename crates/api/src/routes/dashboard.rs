//! Route definitions for the `/dashboard` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /summary -> get_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(dashboard::get_summary))
}
